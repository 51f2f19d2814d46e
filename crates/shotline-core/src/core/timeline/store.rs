//! Timeline State Store
//!
//! Single owner of the video/audio clip lists and ruler markers.
//!
//! - Reconciles the host's segment list with a persisted timeline
//! - Applies partial clip updates (single and bulk)
//! - Notifies subscribers with the full timeline after every change
//!
//! Interaction code never keeps its own authoritative copy of the clips; it
//! reads [`TimelineStore::timeline`] fresh on every frame.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::markers::MarkerSet;
use super::metrics::{self, TimelineMetrics};
use super::models::{
    non_empty, AudioClip, AudioClipPatch, ClipKey, ClipKind, Segment, Timeline, VideoClip,
    VideoClipPatch,
};
use super::validate::validate_video_clips;
use crate::core::settings::TimelineSettings;
use crate::core::{non_negative, ClipId, CoreError, CoreResult, TimeSec, TIME_EPSILON};

/// Key applied when the host does not supply one
pub const DEFAULT_TIMELINE_KEY: &str = "default";

// =============================================================================
// Change Notifications
// =============================================================================

/// How the store arrived at its initial state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitOutcome {
    /// One untrimmed clip per segment, laid out contiguously
    Seeded,
    /// Persisted timeline restored verbatim
    Restored,
    /// Persisted timeline repaired against the current segments
    AutoArranged,
}

/// State change types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StateChange {
    TimelineInitialized { outcome: InitOutcome },
    DurationsSynced { clip_count: usize },
    ClipCreated { clip_id: ClipId },
    ClipModified { clip_id: ClipId },
    ClipDeleted { clip_id: ClipId },
}

/// Payload delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineChanged {
    pub timeline: Timeline,
    pub changes: Vec<StateChange>,
}

/// Subscriber callback
pub type TimelineListener = Box<dyn FnMut(&TimelineChanged) + 'static>;

/// Handle returned by [`TimelineStore::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// =============================================================================
// Store
// =============================================================================

pub struct TimelineStore {
    settings: TimelineSettings,
    segments: Vec<Segment>,
    timeline: Timeline,
    markers: MarkerSet,
    applied_key: Option<String>,
    /// True when the current state came from a persisted timeline
    restored: bool,
    duration_sync_key: Option<String>,
    listeners: Vec<(ListenerId, TimelineListener)>,
    next_listener_id: u64,
}

impl TimelineStore {
    pub fn new(settings: TimelineSettings) -> Self {
        Self {
            settings,
            segments: Vec::new(),
            timeline: Timeline::default(),
            markers: MarkerSet::new(),
            applied_key: None,
            restored: false,
            duration_sync_key: None,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Current clip lists. Always reflects the latest write.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Owned copy of the current clip lists
    pub fn snapshot(&self) -> Timeline {
        self.timeline.clone()
    }

    pub fn video_clips(&self) -> &[VideoClip] {
        &self.timeline.video_clips
    }

    pub fn audio_clips(&self) -> &[AudioClip] {
        &self.timeline.audio_clips
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn applied_key(&self) -> Option<&str> {
        self.applied_key.as_deref()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    pub fn subscribe(&mut self, listener: impl FnMut(&TimelineChanged) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, changes: Vec<StateChange>) {
        if changes.is_empty() || self.listeners.is_empty() {
            return;
        }
        let event = TimelineChanged {
            timeline: self.timeline.clone(),
            changes,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initializes the store only when `key` differs from the last applied key.
    ///
    /// Returns `None` when the key was already applied, so re-renders with the
    /// same key never reset user edits.
    pub fn apply_key(
        &mut self,
        key: Option<&str>,
        segments: Vec<Segment>,
        persisted: Option<Timeline>,
    ) -> Option<InitOutcome> {
        let key = key.unwrap_or(DEFAULT_TIMELINE_KEY);
        if self.applied_key.as_deref() == Some(key) {
            debug!("Timeline key {} already applied", key);
            return None;
        }
        self.applied_key = Some(key.to_string());
        Some(self.initialize(segments, persisted))
    }

    /// Resets the store from `segments` and an optional persisted timeline.
    ///
    /// The persisted timeline is used verbatim only when its video track is
    /// valid against the segments; otherwise it is auto-arranged.
    pub fn initialize(&mut self, segments: Vec<Segment>, persisted: Option<Timeline>) -> InitOutcome {
        self.segments = segments;
        self.markers.clear();

        let outcome = match persisted {
            None => {
                self.timeline = Timeline::new(self.seed_video_clips(), Vec::new());
                self.restored = false;
                InitOutcome::Seeded
            }
            Some(persisted) => {
                self.restored = true;
                let violations = validate_video_clips(
                    &persisted.video_clips,
                    Some(&self.segments),
                    self.settings.min_clip_seconds,
                );
                if violations.is_empty() {
                    self.timeline = persisted;
                    InitOutcome::Restored
                } else {
                    for violation in &violations {
                        warn!("Persisted timeline rejected: {}", violation);
                    }
                    let video = self.auto_arrange(&persisted.video_clips);
                    self.timeline = Timeline::new(video, persisted.audio_clips);
                    InitOutcome::AutoArranged
                }
            }
        };

        info!(
            "Timeline initialized ({:?}): {} video clips, {} audio clips",
            outcome,
            self.timeline.video_clips.len(),
            self.timeline.audio_clips.len()
        );
        self.notify(vec![StateChange::TimelineInitialized { outcome }]);
        outcome
    }

    fn seed_video_clips(&self) -> Vec<VideoClip> {
        let fallback = self.settings.fallback_video_seconds;
        let mut t = 0.0;
        self.segments
            .iter()
            .map(|segment| {
                let duration = segment.safe_duration(fallback);
                let clip = VideoClip::seeded(segment, t, duration);
                t += duration;
                clip
            })
            .collect()
    }

    /// One clip per segment in segment order, carrying over the first matching
    /// persisted clip's identity, duration, trims and source.
    fn auto_arrange(&self, persisted: &[VideoClip]) -> Vec<VideoClip> {
        let min = self.settings.min_clip_seconds;
        let mut first_by_segment: HashMap<&str, &VideoClip> = HashMap::new();
        for clip in persisted {
            first_by_segment.entry(clip.segment_id.as_str()).or_insert(clip);
        }

        let mut t = 0.0;
        let arranged: Vec<VideoClip> = self
            .seed_video_clips()
            .into_iter()
            .map(|base| {
                let Some(prev) = first_by_segment.get(base.segment_id.as_str()) else {
                    let clip = VideoClip { start: t, ..base };
                    t += clip.duration;
                    return clip;
                };

                let duration = if prev.duration.is_finite() && prev.duration > 0.0 {
                    prev.duration
                } else {
                    base.duration
                };
                let trim_end = non_negative(prev.trim_end).min((duration - min).max(0.0));
                let trim_start =
                    non_negative(prev.trim_start).min((duration - trim_end - min).max(0.0));
                let src = non_empty(prev.src.as_deref())
                    .map(str::to_string)
                    .or(base.src);

                let clip = VideoClip {
                    id: prev.id.clone(),
                    segment_id: base.segment_id,
                    title: prev.title.clone(),
                    src,
                    start: t,
                    duration,
                    trim_start,
                    trim_end,
                };
                t += duration;
                clip
            })
            .collect();

        info!(
            "Auto-arranged {} persisted clips onto {} segments",
            persisted.len(),
            arranged.len()
        );
        arranged
    }

    // =========================================================================
    // Segment Updates
    // =========================================================================

    /// Accepts a fresh segment list from the host.
    ///
    /// An identical list is ignored so re-sent props never reset edits.
    /// Otherwise a seeded store re-seeds its video track. A restored store runs the
    /// duration sync instead, at most once per distinct key + durations pair,
    /// and only when `sync_allowed` (no selection, no hovering drag).
    pub fn set_segments(&mut self, segments: Vec<Segment>, sync_allowed: bool) -> bool {
        if segments == self.segments {
            return false;
        }
        self.segments = segments;

        if !self.restored {
            let video = self.seed_video_clips();
            if video == self.timeline.video_clips {
                return false;
            }
            self.timeline.video_clips = video;
            debug!("Video track re-seeded from {} segments", self.segments.len());
            self.notify(vec![StateChange::TimelineInitialized {
                outcome: InitOutcome::Seeded,
            }]);
            return true;
        }

        let sync_key = self.duration_key();
        if self.duration_sync_key.as_deref() == Some(sync_key.as_str()) {
            return false;
        }
        self.duration_sync_key = Some(sync_key);

        if !sync_allowed {
            return false;
        }
        let Some(next) = self.synced_durations() else {
            return false;
        };

        let clip_count = next.len();
        self.timeline.video_clips = next;
        info!("Synced clip durations for {} segments", clip_count);
        self.notify(vec![StateChange::DurationsSynced { clip_count }]);
        true
    }

    fn duration_key(&self) -> String {
        let durations = self
            .segments
            .iter()
            .map(|s| match s.duration_seconds {
                Some(d) if d.is_finite() && d > 0.0 => format!("{}:{}", s.id, d),
                _ => format!("{}:", s.id),
            })
            .collect::<Vec<_>>()
            .join("|");
        format!(
            "{}::{}",
            self.applied_key.as_deref().unwrap_or(DEFAULT_TIMELINE_KEY),
            durations
        )
    }

    /// Returns the re-timed video track, or `None` when the track is not a
    /// plain 1:1 untrimmed layout of the segments or nothing would change.
    fn synced_durations(&self) -> Option<Vec<VideoClip>> {
        let min = self.settings.min_clip_seconds;
        let clips = &self.timeline.video_clips;
        if self.segments.is_empty() || clips.len() != self.segments.len() {
            return None;
        }

        let mut by_segment: HashMap<&str, &VideoClip> = HashMap::new();
        for clip in clips {
            if by_segment.insert(clip.segment_id.as_str(), clip).is_some() {
                return None;
            }
        }

        let mut t0 = 0.0;
        let mut ordered = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            let clip = by_segment.get(segment.id.as_str())?;
            if !clip.start.is_finite() || !clip.duration.is_finite() || clip.duration <= 0.0 {
                return None;
            }
            if (clip.start - t0).abs() > TIME_EPSILON {
                return None;
            }
            if clip.trim_start() > TIME_EPSILON || clip.trim_end() > TIME_EPSILON {
                return None;
            }
            t0 += clip.duration;
            ordered.push((segment, *clip));
        }

        let mismatch = ordered.iter().any(|(segment, clip)| match segment.duration_seconds {
            Some(d) if d.is_finite() && d > 0.0 => (clip.duration - d).abs() > TIME_EPSILON,
            _ => false,
        });
        if !mismatch {
            return None;
        }

        let mut t = 0.0;
        let next = ordered
            .into_iter()
            .map(|(segment, clip)| {
                let duration = segment.safe_duration(clip.duration);
                let trim_start = clip.trim_start().min((duration - clip.trim_end() - min).max(0.0));
                let trim_end = clip.trim_end().min((duration - trim_start - min).max(0.0));
                let src = segment
                    .media_src()
                    .map(str::to_string)
                    .or_else(|| clip.src.clone());
                let next = VideoClip {
                    start: t,
                    duration,
                    trim_start,
                    trim_end,
                    src,
                    ..clip.clone()
                };
                t += duration;
                next
            })
            .collect();
        Some(next)
    }

    // =========================================================================
    // Clip Updates
    // =========================================================================

    /// Runs `mutator` over the clip lists and notifies with the changes it reports.
    /// Nothing is sent when the mutator reports no changes.
    pub fn update<F>(&mut self, mutator: F) -> bool
    where
        F: FnOnce(&mut Timeline) -> Vec<StateChange>,
    {
        let changes = mutator(&mut self.timeline);
        if changes.is_empty() {
            return false;
        }
        self.notify(changes);
        true
    }

    /// Applies a partial update. Returns false when the clip does not exist
    /// or the patch changes nothing.
    pub fn update_video_clip(&mut self, id: &str, patch: &VideoClipPatch) -> bool {
        let Some(clip) = self.timeline.video_clip_mut(id) else {
            debug!("update_video_clip: clip {} not found", id);
            return false;
        };
        let before = clip.clone();
        clip.apply(patch);
        if *clip == before {
            return false;
        }
        self.notify(vec![StateChange::ClipModified {
            clip_id: id.to_string(),
        }]);
        true
    }

    /// Like [`Self::update_video_clip`] but reports a missing clip as an error
    pub fn try_update_video_clip(&mut self, id: &str, patch: &VideoClipPatch) -> CoreResult<()> {
        if self.timeline.video_clip(id).is_none() {
            return Err(CoreError::ClipNotFound(id.to_string()));
        }
        self.update_video_clip(id, patch);
        Ok(())
    }

    /// Applies many patches with a single notification. Unknown ids are skipped.
    pub fn update_video_clips_bulk(&mut self, patches: &[(ClipId, VideoClipPatch)]) -> usize {
        let mut changes = Vec::new();
        for (id, patch) in patches {
            if let Some(clip) = self.timeline.video_clip_mut(id) {
                let before = clip.clone();
                clip.apply(patch);
                if *clip != before {
                    changes.push(StateChange::ClipModified { clip_id: id.clone() });
                }
            }
        }
        let count = changes.len();
        self.notify(changes);
        count
    }

    pub fn update_audio_clip(&mut self, id: &str, patch: &AudioClipPatch) -> bool {
        self.update_audio_clips_bulk(&[(id.to_string(), patch.clone())]) > 0
    }

    pub fn update_audio_clips_bulk(&mut self, patches: &[(ClipId, AudioClipPatch)]) -> usize {
        let mut changes = Vec::new();
        for (id, patch) in patches {
            if let Some(clip) = self.timeline.audio_clip_mut(id) {
                let before = clip.clone();
                clip.apply(patch);
                if *clip != before {
                    changes.push(StateChange::ClipModified { clip_id: id.clone() });
                }
            }
        }
        let count = changes.len();
        self.notify(changes);
        count
    }

    pub fn add_audio_clip(&mut self, clip: AudioClip) {
        let clip_id = clip.id.clone();
        self.timeline.audio_clips.push(clip);
        self.notify(vec![StateChange::ClipCreated { clip_id }]);
    }

    /// Removes the given clips. Neighbors are left where they are.
    pub fn remove_clips(&mut self, keys: &[ClipKey]) -> usize {
        let mut changes = Vec::new();
        self.timeline.video_clips.retain(|c| {
            let hit = keys.iter().any(|k| k.kind == ClipKind::Video && k.id == c.id);
            if hit {
                changes.push(StateChange::ClipDeleted {
                    clip_id: c.id.clone(),
                });
            }
            !hit
        });
        self.timeline.audio_clips.retain(|c| {
            let hit = keys.iter().any(|k| k.kind == ClipKind::Audio && k.id == c.id);
            if hit {
                changes.push(StateChange::ClipDeleted {
                    clip_id: c.id.clone(),
                });
            }
            !hit
        });
        let count = changes.len();
        if count > 0 {
            debug!("Removed {} clips", count);
        }
        self.notify(changes);
        count
    }

    // =========================================================================
    // Markers
    // =========================================================================

    // Markers are not part of the persisted payload, so no notification.

    pub fn add_marker(&mut self, time: TimeSec) -> bool {
        self.markers.add(time)
    }

    pub fn remove_marker(&mut self, time: TimeSec) -> bool {
        self.markers.remove(time)
    }

    pub fn toggle_marker(&mut self, time: TimeSec) -> bool {
        self.markers.toggle(time)
    }

    // =========================================================================
    // Derived
    // =========================================================================

    pub fn total_seconds(&self, viewport_seconds: TimeSec) -> TimeSec {
        metrics::total_seconds(&self.timeline, viewport_seconds, &self.settings)
    }

    pub fn metrics(&self, px_per_second: f64, viewport_seconds: TimeSec) -> TimelineMetrics {
        TimelineMetrics::compute(&self.timeline, px_per_second, viewport_seconds, &self.settings)
    }
}
