//! Clip Interaction Controller
//!
//! Pointer-driven trim and move of video clips, and move of audio clips.
//!
//! A drag is an explicit [`DragSession`] created on pointer-down and dropped on
//! pointer-up. Pointer moves only record the latest x position; the actual
//! recomputation runs once per animation frame against the store's live clip
//! list, so a clip deleted mid-drag simply turns the frame into a no-op.
//!
//! Move drags have two regimes:
//! - no-ripple: the moved set stops at the first fixed neighbor on either side
//! - ripple: every clip starting at or after the moved set moves with it
//!
//! Leftward motion uses ripple. Rightward motion uses no-ripple until it runs
//! into the no-ripple cap, then latches into ripple for the rest of the drag.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::models::{AudioClip, AudioClipPatch, ClipKey, ClipKind, VideoClip, VideoClipPatch};
use super::selection::Selection;
use super::snap::snap_delta;
use super::store::TimelineStore;
use super::viewport::ViewportState;
use crate::core::{clamp_time, ClipId, SegmentId, TimeSec, TIME_EPSILON};

// =============================================================================
// Pointer Input
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// A pointer event as forwarded by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    pub client_x: f64,
    #[serde(default)]
    pub pointer_id: Option<i32>,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn at(client_x: f64) -> Self {
        Self {
            client_x,
            ..Self::default()
        }
    }

    pub fn with_pointer_id(mut self, id: i32) -> Self {
        self.pointer_id = Some(id);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

// =============================================================================
// Hit Testing
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Edge {
    Start,
    End,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoHit {
    pub clip_id: ClipId,
    pub segment_id: SegmentId,
    pub visible_start: TimeSec,
    pub visible_end: TimeSec,
    /// Trim handle under the pointer, `None` for a body grab
    pub edge: Option<Edge>,
}

/// First video clip whose visible interval contains `seconds`.
///
/// Within `edge_threshold` of the visible start the hit is a start-trim handle,
/// else within it of the visible end an end-trim handle.
pub fn hit_test_video(clips: &[VideoClip], seconds: TimeSec, edge_threshold: TimeSec) -> Option<VideoHit> {
    if !seconds.is_finite() {
        return None;
    }
    clips.iter().find_map(|c| {
        let vs = c.visible_start();
        let ve = c.visible_end();
        if seconds < vs || seconds > ve {
            return None;
        }
        let edge = if (seconds - vs).abs() <= edge_threshold {
            Some(Edge::Start)
        } else if (ve - seconds).abs() <= edge_threshold {
            Some(Edge::End)
        } else {
            None
        };
        Some(VideoHit {
            clip_id: c.id.clone(),
            segment_id: c.segment_id.clone(),
            visible_start: vs,
            visible_end: ve,
            edge,
        })
    })
}

/// First audio clip whose `[start, start + duration]` contains `seconds`
pub fn hit_test_audio(clips: &[AudioClip], seconds: TimeSec) -> Option<ClipId> {
    if !seconds.is_finite() {
        return None;
    }
    clips
        .iter()
        .find(|c| seconds >= c.start && seconds <= c.end())
        .map(|c| c.id.clone())
}

// =============================================================================
// Move Context
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveMode {
    NoRipple,
    Ripple,
}

/// Bounds, snap anchors and targets of one move regime
#[derive(Clone, Debug, PartialEq)]
pub struct MoveRegime {
    pub min_delta: TimeSec,
    pub max_delta: TimeSec,
    pub anchors: Vec<TimeSec>,
    /// `(clip id, start at drag begin)` of every clip this regime moves
    pub targets: Vec<(ClipId, TimeSec)>,
}

/// Everything a move drag needs, computed once at pointer-down
#[derive(Clone, Debug, PartialEq)]
pub struct MoveContext {
    pub group_start: TimeSec,
    pub group_end: TimeSec,
    pub no_ripple: MoveRegime,
    pub ripple: MoveRegime,
    /// Clips the ripple regime may have displaced; no-ripple puts them back
    pub right_candidates: Vec<(ClipId, TimeSec)>,
}

struct Placed<'a> {
    id: &'a str,
    start0: TimeSec,
    trim_start: TimeSec,
    vs: TimeSec,
    ve: TimeSec,
}

impl<'a> Placed<'a> {
    fn of(c: &'a VideoClip) -> Self {
        Self {
            id: &c.id,
            start0: c.start,
            trim_start: c.trim_start(),
            vs: c.visible_start(),
            ve: c.visible_end(),
        }
    }

    fn lowest_delta(&self) -> TimeSec {
        -self.trim_start - self.start0
    }

    fn target(&self) -> (ClipId, TimeSec) {
        (self.id.to_string(), self.start0)
    }
}

impl MoveContext {
    /// Builds both regimes for moving `selected` over `clips`.
    ///
    /// Returns `None` when none of the selected ids exist.
    pub fn build(
        clips: &[VideoClip],
        selected: &[ClipId],
        markers: &[TimeSec],
        px_per_second: f64,
    ) -> Option<Self> {
        let eps = 1.0 / px_per_second;
        let selected_ids: HashSet<&str> = selected.iter().map(String::as_str).collect();

        let moved: Vec<Placed> = clips
            .iter()
            .filter(|c| selected_ids.contains(c.id.as_str()))
            .map(Placed::of)
            .collect();
        if moved.is_empty() {
            return None;
        }
        let others: Vec<Placed> = clips
            .iter()
            .filter(|c| !selected_ids.contains(c.id.as_str()))
            .map(Placed::of)
            .collect();

        let group_start = moved.iter().map(|c| c.vs).fold(f64::INFINITY, f64::min);
        let group_end = moved.iter().map(|c| c.ve).fold(f64::NEG_INFINITY, f64::max);

        let left_side: Vec<&Placed> = others.iter().filter(|c| c.ve <= group_start + eps).collect();
        let right_side: Vec<&Placed> = others.iter().filter(|c| c.vs >= group_start - eps).collect();
        let left_bound = left_side
            .iter()
            .map(|c| c.ve - group_start)
            .fold(f64::NEG_INFINITY, f64::max);

        // No-ripple: every moved clip stays between its fixed neighbors.
        let mut min_no_ripple = moved.iter().map(Placed::lowest_delta).fold(f64::NEG_INFINITY, f64::max);
        let mut max_no_ripple = f64::INFINITY;
        for m in &moved {
            for o in &others {
                if o.ve <= m.vs + eps {
                    min_no_ripple = min_no_ripple.max(o.ve - m.vs);
                } else if o.vs >= m.ve - eps {
                    max_no_ripple = max_no_ripple.min((o.vs - m.ve).max(0.0));
                }
            }
        }

        let ripple_set: Vec<&Placed> = moved.iter().chain(right_side.iter().copied()).collect();
        let min_ripple = ripple_set
            .iter()
            .map(|c| c.lowest_delta())
            .fold(f64::NEG_INFINITY, f64::max)
            .max(left_bound);

        let mut anchors_all = vec![0.0];
        anchors_all.extend_from_slice(markers);
        let mut anchors_left = anchors_all.clone();
        for o in &others {
            anchors_all.push(o.vs);
            anchors_all.push(o.ve);
        }
        for o in &left_side {
            anchors_left.push(o.vs);
            anchors_left.push(o.ve);
        }

        Some(Self {
            group_start,
            group_end,
            no_ripple: MoveRegime {
                min_delta: min_no_ripple,
                max_delta: max_no_ripple,
                anchors: anchors_all,
                targets: moved.iter().map(Placed::target).collect(),
            },
            ripple: MoveRegime {
                min_delta: min_ripple,
                max_delta: f64::INFINITY,
                anchors: anchors_left,
                targets: ripple_set.iter().map(|c| c.target()).collect(),
            },
            right_candidates: right_side.iter().map(|c| c.target()).collect(),
        })
    }

    pub fn regime(&self, mode: MoveMode) -> &MoveRegime {
        match mode {
            MoveMode::NoRipple => &self.no_ripple,
            MoveMode::Ripple => &self.ripple,
        }
    }

    /// Final delta for a raw pointer delta: clamp, snap, clamp again.
    ///
    /// Snapping starts from the clamped delta, not the raw one, so a pointer
    /// far past a bound rests on the bound instead of snapping to an anchor
    /// beyond it. The second clamp keeps the snapped result inside the regime.
    pub fn resolve_delta(&self, mode: MoveMode, dx: TimeSec, snap_threshold: TimeSec) -> TimeSec {
        let regime = self.regime(mode);
        let base = clamp_time(dx, regime.min_delta, regime.max_delta);
        let snapped = snap_delta(
            base,
            self.group_start,
            self.group_end,
            &regime.anchors,
            snap_threshold,
        );
        clamp_time(snapped.unwrap_or(base), regime.min_delta, regime.max_delta)
    }

    /// Start patches for every clip affected by `delta` in `mode`
    pub fn patches(&self, mode: MoveMode, delta: TimeSec) -> Vec<(ClipId, VideoClipPatch)> {
        let regime = self.regime(mode);
        let mut patches: Vec<(ClipId, VideoClipPatch)> = regime
            .targets
            .iter()
            .map(|(id, start0)| (id.clone(), VideoClipPatch::start(start0 + delta)))
            .collect();
        if mode == MoveMode::NoRipple {
            patches.extend(
                self.right_candidates
                    .iter()
                    .map(|(id, start0)| (id.clone(), VideoClipPatch::start(*start0))),
            );
        }
        patches
    }
}

// =============================================================================
// Drag Session
// =============================================================================

#[derive(Clone, Debug)]
enum SessionKind {
    Trim {
        /// Copy of the clip at drag begin
        clip: VideoClip,
        edge: Edge,
    },
    Move {
        ctx: Option<MoveContext>,
        mode: MoveMode,
        latched: bool,
    },
    Audio {
        clip_id: ClipId,
        /// `(id, start at drag begin)` of every moved audio clip
        starts: Vec<(ClipId, TimeSec)>,
    },
}

/// One pointer drag, from pointer-down to pointer-up
#[derive(Clone, Debug)]
pub struct DragSession {
    pointer_id: Option<i32>,
    container_left_px: f64,
    px_per_second: f64,
    origin_seconds: TimeSec,
    last_client_x: f64,
    frame_pending: bool,
    kind: SessionKind,
}

impl DragSession {
    fn new(input: &PointerInput, viewport: &ViewportState, origin_seconds: TimeSec, kind: SessionKind) -> Self {
        Self {
            pointer_id: input.pointer_id,
            container_left_px: viewport.container_left_px,
            px_per_second: viewport.px_per_second,
            origin_seconds,
            last_client_x: input.client_x,
            frame_pending: false,
            kind,
        }
    }

    fn accepts(&self, pointer_id: Option<i32>) -> bool {
        self.pointer_id.is_none() || self.pointer_id == pointer_id
    }

    /// Seconds under `client_x`, using the rect captured at drag begin and the
    /// live scroll offset
    fn seconds_at(&self, client_x: f64, scroll_left_px: f64, track_offset_px: f64) -> TimeSec {
        (client_x - self.container_left_px + scroll_left_px - track_offset_px) / self.px_per_second
    }

    pub fn mode(&self) -> Option<MoveMode> {
        match &self.kind {
            SessionKind::Move { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    pub fn is_trim(&self) -> bool {
        matches!(self.kind, SessionKind::Trim { .. })
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }
}

// =============================================================================
// Controller
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum PointerDownOutcome {
    /// Nothing under the pointer; `cleared` when the selection was reset
    Missed { cleared: bool },
    /// Modifier-click toggled the clip's membership
    Toggled { selected: bool },
    /// A drag session began; `segment_id` is set for video clips
    DragStarted { segment_id: Option<SegmentId> },
    /// Another drag is still in progress
    Busy,
}

/// What one animation frame did
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Playhead position to report while trimming
    pub seek: Option<TimeSec>,
    pub changed: bool,
}

/// Result of ending a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionEnd {
    /// A frame was still scheduled and must be cancelled by the host
    pub cancel_frame: bool,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    session: Option<DragSession>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a drag session is active
    pub fn is_interacting(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn pointer_down_video(
        &mut self,
        store: &TimelineStore,
        selection: &mut Selection,
        input: &PointerInput,
        viewport: &ViewportState,
    ) -> PointerDownOutcome {
        if self.session.is_some() {
            return PointerDownOutcome::Busy;
        }
        let settings = store.settings();
        let pps = viewport.px_per_second;
        let seconds = viewport.seconds_at_client_x(input.client_x, settings);

        let Some(hit) = hit_test_video(store.video_clips(), seconds, settings.edge_handle_px / pps) else {
            return Self::missed(selection, input);
        };
        let key = ClipKey::video(&hit.clip_id);
        if input.modifiers.any() {
            return PointerDownOutcome::Toggled {
                selected: selection.toggle(key),
            };
        }

        let kind = match hit.edge {
            Some(edge) => {
                if !selection.contains(&key) {
                    selection.select_only(key);
                }
                let Some(clip) = store.timeline().video_clip(&hit.clip_id).cloned() else {
                    return PointerDownOutcome::Missed { cleared: false };
                };
                debug!("Trim {:?} session on {}", edge, clip.id);
                SessionKind::Trim { clip, edge }
            }
            None => {
                let moved = if selection.contains(&key) {
                    selection.ids(ClipKind::Video)
                } else {
                    selection.select_only(key);
                    vec![hit.clip_id.clone()]
                };
                let ctx = MoveContext::build(store.video_clips(), &moved, store.markers().as_slice(), pps);
                debug!("Move session on {} clip(s)", moved.len());
                SessionKind::Move {
                    ctx,
                    mode: MoveMode::NoRipple,
                    latched: false,
                }
            }
        };

        self.session = Some(DragSession::new(input, viewport, seconds, kind));
        PointerDownOutcome::DragStarted {
            segment_id: Some(hit.segment_id),
        }
    }

    pub fn pointer_down_audio(
        &mut self,
        store: &TimelineStore,
        selection: &mut Selection,
        input: &PointerInput,
        viewport: &ViewportState,
    ) -> PointerDownOutcome {
        if self.session.is_some() {
            return PointerDownOutcome::Busy;
        }
        let seconds = viewport.seconds_at_client_x(input.client_x, store.settings());
        let Some(clip_id) = hit_test_audio(store.audio_clips(), seconds) else {
            return Self::missed(selection, input);
        };
        let key = ClipKey::audio(&clip_id);
        if input.modifiers.any() {
            return PointerDownOutcome::Toggled {
                selected: selection.toggle(key),
            };
        }

        let moved = if selection.contains(&key) {
            selection.ids(ClipKind::Audio)
        } else {
            selection.select_only(key);
            vec![clip_id.clone()]
        };
        let starts = store
            .audio_clips()
            .iter()
            .filter(|c| moved.contains(&c.id))
            .map(|c| (c.id.clone(), c.start))
            .collect();

        debug!("Audio move session on {} clip(s)", moved.len());
        self.session = Some(DragSession::new(
            input,
            viewport,
            seconds,
            SessionKind::Audio { clip_id, starts },
        ));
        PointerDownOutcome::DragStarted { segment_id: None }
    }

    fn missed(selection: &mut Selection, input: &PointerInput) -> PointerDownOutcome {
        let cleared = !input.modifiers.any() && !selection.is_empty();
        if !input.modifiers.any() {
            selection.clear();
        }
        PointerDownOutcome::Missed { cleared }
    }

    /// Records the pointer position. Returns true when the host should
    /// schedule an animation frame (none is pending yet).
    pub fn pointer_move(&mut self, input: &PointerInput) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.accepts(input.pointer_id) {
            return false;
        }
        session.last_client_x = input.client_x;
        if session.frame_pending {
            return false;
        }
        session.frame_pending = true;
        true
    }

    /// Applies one recomputation for the latest pointer position.
    /// Returns `None` when no session or no pending frame exists.
    pub fn animation_frame(&mut self, store: &mut TimelineStore, viewport: &ViewportState) -> Option<FrameOutcome> {
        let session = self.session.as_mut()?;
        if !session.frame_pending {
            return None;
        }
        session.frame_pending = false;

        let settings = store.settings();
        let min_visible = settings.min_clip_seconds;
        let snap_threshold = settings.snap_threshold_px / session.px_per_second;
        let deadzone = settings.move_deadzone_px / session.px_per_second;
        let now = session.seconds_at(session.last_client_x, viewport.scroll_left_px, settings.track_offset_px);
        let dx = now - session.origin_seconds;
        trace!("Drag frame dx={:.4}s", dx);

        let outcome = match &mut session.kind {
            SessionKind::Trim { clip, edge } => apply_trim(store, clip, *edge, dx, min_visible),
            SessionKind::Move { ctx, mode, latched } => {
                let Some(ctx) = ctx.as_ref() else {
                    return Some(FrameOutcome::default());
                };
                if !*latched {
                    if dx < -deadzone {
                        *mode = MoveMode::Ripple;
                    } else if dx > deadzone {
                        if dx > ctx.no_ripple.max_delta - deadzone {
                            debug!("Move latched into ripple at dx={:.3}s", dx);
                            *mode = MoveMode::Ripple;
                            *latched = true;
                        } else {
                            *mode = MoveMode::NoRipple;
                        }
                    }
                }
                let delta = ctx.resolve_delta(*mode, dx, snap_threshold);
                let changed = store.update_video_clips_bulk(&ctx.patches(*mode, delta)) > 0;
                FrameOutcome { seek: None, changed }
            }
            SessionKind::Audio { clip_id, starts } => apply_audio_move(store, clip_id, starts, dx),
        };
        Some(outcome)
    }

    /// Ends the session for a matching pointer. Events from another pointer
    /// are ignored and return `None`.
    pub fn pointer_up(&mut self, pointer_id: Option<i32>) -> Option<SessionEnd> {
        if !self.session.as_ref()?.accepts(pointer_id) {
            return None;
        }
        let session = self.session.take()?;
        debug!("Drag session ended");
        Some(SessionEnd {
            cancel_frame: session.frame_pending,
        })
    }

    /// Drops any session unconditionally
    pub fn cancel(&mut self) -> Option<SessionEnd> {
        let session = self.session.take()?;
        Some(SessionEnd {
            cancel_frame: session.frame_pending,
        })
    }
}

// =============================================================================
// Frame Math
// =============================================================================

/// Visible intervals of every live clip except `id`, sorted by start
fn neighbor_intervals(clips: &[VideoClip], id: &str) -> Vec<(TimeSec, TimeSec)> {
    let mut others: Vec<(TimeSec, TimeSec)> = clips
        .iter()
        .filter(|c| c.id != id)
        .map(|c| (c.visible_start(), c.visible_end()))
        .filter(|(vs, ve)| *ve > *vs + TIME_EPSILON)
        .collect();
    others.sort_by(|a, b| a.0.total_cmp(&b.0));
    others
}

/// Bounds of `trim_start` given the live neighbors, as `(min, max)`
pub fn trim_start_bounds(clip: &VideoClip, clips: &[VideoClip], min_visible: TimeSec) -> (TimeSec, TimeSec) {
    let others = neighbor_intervals(clips, &clip.id);
    let insert_at = others.partition_point(|(vs, _)| *vs <= clip.visible_start());
    let prev_end = if insert_at > 0 { others[insert_at - 1].1 } else { 0.0 };
    let min = 0.0_f64.max(prev_end - clip.start).max(-clip.start);
    let max = clip.duration - clip.trim_end() - min_visible;
    (min, max)
}

/// Bounds of `trim_end` given the live neighbors, as `(min, max)`
pub fn trim_end_bounds(clip: &VideoClip, clips: &[VideoClip], min_visible: TimeSec) -> (TimeSec, TimeSec) {
    let others = neighbor_intervals(clips, &clip.id);
    let insert_at = others.partition_point(|(vs, _)| *vs <= clip.visible_start());
    let min = match others.get(insert_at) {
        Some((next_start, _)) => (clip.frame_end() - next_start).max(0.0),
        None => 0.0,
    };
    let max = clip.duration - clip.trim_start() - min_visible;
    (min, max)
}

fn apply_trim(store: &mut TimelineStore, clip: &VideoClip, edge: Edge, dx: TimeSec, min_visible: TimeSec) -> FrameOutcome {
    if store.timeline().video_clip(&clip.id).is_none() {
        trace!("Trim target {} is gone", clip.id);
        return FrameOutcome::default();
    }
    let live = store.video_clips();
    match edge {
        Edge::Start => {
            let (min, max) = trim_start_bounds(clip, live, min_visible);
            if min > max {
                return FrameOutcome::default();
            }
            let next = clamp_time(clip.trim_start() + dx, min, max);
            let changed = store.update_video_clip(&clip.id, &VideoClipPatch::trim_start(next));
            FrameOutcome {
                seek: Some((clip.start + next).max(0.0)),
                changed,
            }
        }
        Edge::End => {
            let (min, max) = trim_end_bounds(clip, live, min_visible);
            if min > max {
                return FrameOutcome::default();
            }
            let next = clamp_time(clip.trim_end() - dx, min, max);
            let changed = store.update_video_clip(&clip.id, &VideoClipPatch::trim_end(next));
            FrameOutcome {
                seek: Some((clip.frame_end() - next).max(0.0)),
                changed,
            }
        }
    }
}

fn apply_audio_move(store: &mut TimelineStore, clip_id: &str, starts: &[(ClipId, TimeSec)], dx: TimeSec) -> FrameOutcome {
    let patches: Vec<(ClipId, AudioClipPatch)> = if starts.len() <= 1 {
        let start0 = starts
            .iter()
            .find(|(id, _)| id == clip_id)
            .map(|(_, s)| *s)
            .unwrap_or(0.0);
        vec![(clip_id.to_string(), AudioClipPatch::start((start0 + dx).max(0.0)))]
    } else {
        let min_delta = starts.iter().map(|(_, s)| -s).fold(f64::NEG_INFINITY, f64::max);
        let delta = dx.max(min_delta);
        starts
            .iter()
            .map(|(id, s0)| (id.clone(), AudioClipPatch::start((s0 + delta).max(0.0))))
            .collect()
    };
    FrameOutcome {
        seek: None,
        changed: store.update_audio_clips_bulk(&patches) > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::TimelineSettings;
    use crate::core::timeline::models::{Segment, Timeline};

    fn clip(id: &str, start: f64, duration: f64) -> VideoClip {
        VideoClip::seeded(&Segment::new(id, id), start, duration)
    }

    fn store_of(clips: Vec<VideoClip>) -> TimelineStore {
        let mut store = TimelineStore::new(TimelineSettings::default());
        let segments = clips
            .iter()
            .map(|c| Segment::new(&c.segment_id, &c.title))
            .collect();
        store.initialize(segments, Some(Timeline::new(clips, vec![])));
        store
    }

    fn viewport() -> ViewportState {
        ViewportState::new(&TimelineSettings::default())
    }

    /// Client x for a time value with the default viewport
    fn x(seconds: f64) -> f64 {
        72.0 + seconds * 48.0
    }

    fn drag(
        controller: &mut InteractionController,
        store: &mut TimelineStore,
        to_seconds: f64,
    ) -> Option<FrameOutcome> {
        controller.pointer_move(&PointerInput::at(x(to_seconds)));
        controller.animation_frame(store, &viewport())
    }

    #[test]
    fn test_hit_test_edges_and_body() {
        let clips = vec![clip("a", 0.0, 4.0)];
        let threshold = 8.0 / 48.0;
        assert_eq!(hit_test_video(&clips, 0.1, threshold).unwrap().edge, Some(Edge::Start));
        assert_eq!(hit_test_video(&clips, 3.9, threshold).unwrap().edge, Some(Edge::End));
        assert_eq!(hit_test_video(&clips, 2.0, threshold).unwrap().edge, None);
        assert!(hit_test_video(&clips, 4.5, threshold).is_none());
        assert!(hit_test_video(&clips, f64::NAN, threshold).is_none());
    }

    #[test]
    fn test_background_click_clears_selection_without_modifier() {
        let store = store_of(vec![clip("a", 0.0, 4.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();
        selection.toggle(ClipKey::video("v-a"));

        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        let outcome = controller.pointer_down_video(
            &store,
            &mut selection,
            &PointerInput::at(x(10.0)).with_modifiers(shift),
            &viewport(),
        );
        assert_eq!(outcome, PointerDownOutcome::Missed { cleared: false });
        assert_eq!(selection.len(), 1);

        let outcome = controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(10.0)), &viewport());
        assert_eq!(outcome, PointerDownOutcome::Missed { cleared: true });
        assert!(selection.is_empty());
    }

    #[test]
    fn test_modifier_click_toggles() {
        let store = store_of(vec![clip("a", 0.0, 4.0), clip("b", 4.0, 4.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };

        for seconds in [2.0, 6.0] {
            controller.pointer_down_video(
                &store,
                &mut selection,
                &PointerInput::at(x(seconds)).with_modifiers(ctrl),
                &viewport(),
            );
        }
        assert_eq!(selection.keys()[0], ClipKey::video("v-b"));
        assert_eq!(selection.len(), 2);
        assert!(!controller.is_interacting());
    }

    #[test]
    fn test_plain_click_collapses_selection_and_starts_drag() {
        let store = store_of(vec![clip("a", 0.0, 4.0), clip("b", 4.0, 4.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();
        selection.toggle(ClipKey::video("v-b"));

        let outcome = controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(2.0)), &viewport());
        assert_eq!(
            outcome,
            PointerDownOutcome::DragStarted {
                segment_id: Some("a".to_string())
            }
        );
        assert_eq!(selection.keys(), &[ClipKey::video("v-a")]);
        assert!(controller.is_interacting());
    }

    #[test]
    fn test_trim_start_bounded_by_previous_neighbor() {
        let mut store = store_of(vec![clip("a", 0.0, 3.0), clip("b", 3.0, 4.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(3.05)), &viewport());
        assert!(controller.session().unwrap().is_trim());

        // Leftward into A: stays at 0.
        let frame = drag(&mut controller, &mut store, 2.05).unwrap();
        assert_eq!(store.timeline().video_clip("v-b").unwrap().trim_start, 0.0);
        assert_eq!(frame.seek, Some(3.0));

        // Rightward 1s: trims normally.
        drag(&mut controller, &mut store, 4.05);
        let b = store.timeline().video_clip("v-b").unwrap();
        assert!((b.trim_start - 1.0).abs() < 1e-9);
        assert_eq!(b.start, 3.0);
    }

    #[test]
    fn test_trim_end_keeps_min_visible() {
        let mut store = store_of(vec![clip("a", 0.0, 3.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(2.95)), &viewport());
        drag(&mut controller, &mut store, -10.0);
        let a = store.timeline().video_clip("v-a").unwrap();
        assert!((a.trim_end - 2.5).abs() < 1e-9);
        assert!((a.visible_len() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_trim_end_bounds_with_gap() {
        let a = clip("a", 0.0, 3.0);
        let b = clip("b", 5.0, 2.0);
        let clips = vec![a.clone(), b];
        let (min, max) = trim_end_bounds(&a, &clips, 0.5);
        assert_eq!(min, 0.0);
        assert_eq!(max, 2.5);

        let mut wide = clip("w", 0.0, 8.0);
        wide.trim_end = 4.0;
        let clips = vec![wide.clone(), clip("b", 5.0, 2.0)];
        let (min, _) = trim_end_bounds(&wide, &clips, 0.5);
        assert_eq!(min, 3.0);
    }

    #[test]
    fn test_trim_of_deleted_clip_is_noop() {
        let mut store = store_of(vec![clip("a", 0.0, 3.0), clip("b", 3.0, 3.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(2.95)), &viewport());
        store.remove_clips(&[ClipKey::video("v-a")]);

        let frame = drag(&mut controller, &mut store, 2.0).unwrap();
        assert_eq!(frame, FrameOutcome::default());
        assert_eq!(store.video_clips().len(), 1);
        assert!(controller.pointer_up(None).is_some());
    }

    #[test]
    fn test_move_right_stops_at_neighbor_then_ripples() {
        let mut store = store_of(vec![clip("a", 0.0, 2.0), clip("b", 3.0, 2.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(1.0)), &viewport());

        // 0.5s right: free space, no ripple.
        drag(&mut controller, &mut store, 1.5);
        assert_eq!(store.timeline().video_clip("v-a").unwrap().start, 0.5);
        assert_eq!(store.timeline().video_clip("v-b").unwrap().start, 3.0);
        assert_eq!(controller.session().unwrap().mode(), Some(MoveMode::NoRipple));

        // 2s right: past the 1s cap, latches into ripple and pushes B.
        drag(&mut controller, &mut store, 3.0);
        assert_eq!(controller.session().unwrap().mode(), Some(MoveMode::Ripple));
        assert_eq!(store.timeline().video_clip("v-a").unwrap().start, 2.0);
        assert_eq!(store.timeline().video_clip("v-b").unwrap().start, 5.0);

        // Back to 0.5s right: still ripple.
        drag(&mut controller, &mut store, 1.5);
        assert_eq!(controller.session().unwrap().mode(), Some(MoveMode::Ripple));
        assert_eq!(store.timeline().video_clip("v-b").unwrap().start, 3.5);
    }

    #[test]
    fn test_move_left_is_bounded_by_left_neighbor() {
        let mut store = store_of(vec![clip("a", 0.0, 2.0), clip("b", 4.0, 2.0), clip("c", 6.0, 2.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(5.0)), &viewport());
        drag(&mut controller, &mut store, 1.0);

        assert_eq!(store.timeline().video_clip("v-b").unwrap().start, 2.0);
        // C ripples along.
        assert_eq!(store.timeline().video_clip("v-c").unwrap().start, 4.0);
    }

    #[test]
    fn test_move_snaps_to_marker() {
        let mut store = store_of(vec![clip("a", 0.0, 2.0)]);
        store.add_marker(5.0);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(1.0)), &viewport());
        // End edge lands at 4.9, within 8px (1/6 s) of the marker.
        drag(&mut controller, &mut store, 3.9);
        let a = store.timeline().video_clip("v-a").unwrap();
        assert!((a.visible_end() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_move_coalesces_frames() {
        let mut store = store_of(vec![clip("a", 0.0, 2.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();
        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(1.0)), &viewport());

        assert!(controller.pointer_move(&PointerInput::at(x(1.5))));
        assert!(!controller.pointer_move(&PointerInput::at(x(2.0))));
        assert!(!controller.pointer_move(&PointerInput::at(x(3.0))));

        assert!(controller.animation_frame(&mut store, &viewport()).is_some());
        assert_eq!(store.timeline().video_clip("v-a").unwrap().start, 2.0);
        assert!(controller.animation_frame(&mut store, &viewport()).is_none());
    }

    #[test]
    fn test_pointer_up_ignores_other_pointers() {
        let store = store_of(vec![clip("a", 0.0, 2.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();
        controller.pointer_down_video(
            &store,
            &mut selection,
            &PointerInput::at(x(1.0)).with_pointer_id(7),
            &viewport(),
        );

        assert!(!controller.pointer_move(&PointerInput::at(x(1.5)).with_pointer_id(3)));
        assert!(controller.pointer_up(Some(3)).is_none());
        assert!(controller.is_interacting());

        assert!(controller.pointer_move(&PointerInput::at(x(1.5)).with_pointer_id(7)));
        let end = controller.pointer_up(Some(7)).unwrap();
        assert!(end.cancel_frame);
        assert!(!controller.is_interacting());
    }

    #[test]
    fn test_audio_group_move_stops_at_zero() {
        let mut store = TimelineStore::new(TimelineSettings::default());
        let audio = |id: &str, start: f64| AudioClip {
            id: id.to_string(),
            asset_id: "m".to_string(),
            name: "Music".to_string(),
            start,
            duration: 3.0,
            src: None,
        };
        store.initialize(vec![], Some(Timeline::new(vec![], vec![audio("a-1", 1.0), audio("a-2", 4.0)])));

        let mut controller = InteractionController::new();
        let mut selection = Selection::new();
        selection.toggle(ClipKey::audio("a-1"));
        selection.toggle(ClipKey::audio("a-2"));

        let outcome = controller.pointer_down_audio(&store, &mut selection, &PointerInput::at(x(2.0)), &viewport());
        assert_eq!(outcome, PointerDownOutcome::DragStarted { segment_id: None });
        drag(&mut controller, &mut store, -3.0);

        assert_eq!(store.timeline().audio_clip("a-1").unwrap().start, 0.0);
        assert_eq!(store.timeline().audio_clip("a-2").unwrap().start, 3.0);
    }

    fn starts(store: &TimelineStore) -> Vec<f64> {
        store.video_clips().iter().map(|c| c.start).collect()
    }

    #[test]
    fn test_multi_select_move_shifts_group_and_ripples_between() {
        let mut store = store_of(vec![
            clip("a", 0.0, 2.0),
            clip("b", 3.0, 2.0),
            clip("c", 6.0, 2.0),
            clip("d", 9.0, 2.0),
        ]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();
        selection.toggle(ClipKey::video("v-a"));
        selection.toggle(ClipKey::video("v-c"));

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(1.0)), &viewport());
        assert_eq!(selection.len(), 2);

        // Inside the 1s gap: both selected clips move, B and D stay put.
        drag(&mut controller, &mut store, 1.5);
        assert_eq!(controller.session().unwrap().mode(), Some(MoveMode::NoRipple));
        assert_eq!(starts(&store), vec![0.5, 3.0, 6.5, 9.0]);

        // Past the gap: B (between the selected clips) and D ripple by the same delta.
        drag(&mut controller, &mut store, 3.0);
        assert_eq!(controller.session().unwrap().mode(), Some(MoveMode::Ripple));
        assert_eq!(starts(&store), vec![2.0, 5.0, 8.0, 11.0]);

        controller.pointer_up(None);
        for violation in crate::core::timeline::validate_video_clips(store.video_clips(), None, 0.5) {
            assert!(!matches!(violation, crate::core::timeline::TimelineViolation::Overlap { .. }));
        }
    }

    #[test]
    fn test_no_ripple_restores_right_candidates() {
        let mut store = store_of(vec![clip("a", 0.0, 2.0), clip("b", 3.0, 2.0), clip("c", 6.0, 2.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(4.0)), &viewport());

        // Leftward preview ripples C along with B.
        drag(&mut controller, &mut store, 3.5);
        assert_eq!(controller.session().unwrap().mode(), Some(MoveMode::Ripple));
        assert_eq!(starts(&store), vec![0.0, 2.5, 5.5]);

        // Back to the right within the gap: C returns to where it started.
        drag(&mut controller, &mut store, 4.5);
        assert_eq!(controller.session().unwrap().mode(), Some(MoveMode::NoRipple));
        assert_eq!(starts(&store), vec![0.0, 3.5, 6.0]);
    }

    #[test]
    fn test_move_of_deleted_clip_is_noop() {
        let mut store = store_of(vec![clip("a", 0.0, 2.0), clip("b", 3.0, 2.0)]);
        let mut controller = InteractionController::new();
        let mut selection = Selection::new();

        controller.pointer_down_video(&store, &mut selection, &PointerInput::at(x(1.0)), &viewport());
        store.remove_clips(&[ClipKey::video("v-a")]);

        let frame = drag(&mut controller, &mut store, 1.5).unwrap();
        assert_eq!(frame, FrameOutcome::default());
        assert_eq!(starts(&store), vec![3.0]);
        assert!(controller.pointer_up(None).is_some());
        assert!(!controller.is_interacting());
    }

    #[test]
    fn test_move_context_regimes() {
        let clips = vec![clip("a", 0.0, 2.0), clip("b", 2.0, 2.0), clip("c", 5.0, 2.0)];
        let ctx = MoveContext::build(&clips, &["v-b".to_string()], &[], 48.0).unwrap();

        assert_eq!(ctx.group_start, 2.0);
        assert_eq!(ctx.group_end, 4.0);
        assert_eq!(ctx.no_ripple.min_delta, 0.0);
        assert_eq!(ctx.no_ripple.max_delta, 1.0);
        assert_eq!(ctx.ripple.max_delta, f64::INFINITY);
        assert_eq!(ctx.ripple.targets.len(), 2);
        assert!(!ctx.ripple.anchors.contains(&5.0));
        assert!(ctx.no_ripple.anchors.contains(&5.0));
    }

    #[test]
    fn test_resolve_delta_clamps_before_snapping() {
        let clips = vec![clip("a", 0.0, 2.0), clip("b", 2.0, 2.0), clip("c", 5.0, 2.0)];
        let ctx = MoveContext::build(&clips, &["v-b".to_string()], &[], 48.0).unwrap();
        let threshold = 8.0 / 48.0;

        // Raw 3s would put B's end on C's end (7s); the cap holds it at C's start.
        assert_eq!(ctx.resolve_delta(MoveMode::NoRipple, 3.0, threshold), 1.0);
        // Inside the bounds the end edge snaps onto C's start.
        assert_eq!(ctx.resolve_delta(MoveMode::NoRipple, 0.875, threshold), 1.0);
        // Below the lower bound: rests against A.
        assert_eq!(ctx.resolve_delta(MoveMode::NoRipple, -2.0, threshold), 0.0);
    }
}
