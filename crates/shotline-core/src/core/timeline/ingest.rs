//! Drag-and-Drop Ingestion
//!
//! Parses asset drag payloads and turns a drop into a clip insertion. Dropping
//! video inside another clip's visible window splits that clip; every clip at
//! or after the insertion point ripples right by the inserted duration.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::models::{safe_duration, AudioClip, ClipKey, VideoClip};
use super::store::{StateChange, TimelineStore};
use crate::core::{
    clamp_time, AssetId, ClipId, CoreError, CoreResult, SegmentId, TimeRange, TimeSec,
    TIME_EPSILON,
};

/// MIME type carrying the JSON asset descriptor during native drag-and-drop
pub const ASSET_MIME: &str = "application/x-ai-video-asset";

/// Fallback MIME type checked when [`ASSET_MIME`] is empty
pub const TEXT_PLAIN_MIME: &str = "text/plain";

// =============================================================================
// Asset Descriptors
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAsset {
    pub id: AssetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAsset {
    pub id: AssetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: AssetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// Drag payload, tagged by `kind`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AssetDescriptor {
    Audio(AudioAsset),
    Video(VideoAsset),
    Media(MediaAsset),
}

impl AssetDescriptor {
    pub fn id(&self) -> &str {
        match self {
            Self::Audio(a) => &a.id,
            Self::Video(v) => &v.id,
            Self::Media(m) => &m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Audio(a) => &a.name,
            Self::Video(v) => &v.name,
            Self::Media(m) => &m.name,
        }
    }
}

/// Parses a JSON asset descriptor. Unknown kinds, malformed JSON and empty
/// `id`/`name` are rejected.
pub fn parse_asset_payload(json: &str) -> CoreResult<AssetDescriptor> {
    let asset: AssetDescriptor = serde_json::from_str(json)
        .map_err(|e| CoreError::InvalidAssetPayload(e.to_string()))?;
    if asset.id().is_empty() {
        return Err(CoreError::InvalidAssetPayload("missing asset id".to_string()));
    }
    if asset.name().is_empty() {
        return Err(CoreError::InvalidAssetPayload("missing asset name".to_string()));
    }
    Ok(asset)
}

/// Reads the descriptor from the drag data, preferring [`ASSET_MIME`] and
/// falling back to [`TEXT_PLAIN_MIME`].
pub fn parse_transfer(custom: Option<&str>, text_plain: Option<&str>) -> CoreResult<AssetDescriptor> {
    let payload = custom
        .filter(|s| !s.is_empty())
        .or(text_plain.filter(|s| !s.is_empty()))
        .ok_or_else(|| CoreError::InvalidAssetPayload("empty drag data".to_string()))?;
    parse_asset_payload(payload).inspect_err(|e| warn!("Rejected drag payload: {}", e))
}

// =============================================================================
// Drop
// =============================================================================

/// Result of a successful drop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOutcome {
    /// The newly created clip
    pub clip: ClipKey,
    /// Segment to report as newly active, when the asset is a known segment
    pub segment_id: Option<SegmentId>,
    /// `(left, right)` ids when an existing clip was split
    pub split: Option<(ClipId, ClipId)>,
}

/// Inserts `asset` at `seconds`, clamped to `[0, total_seconds]`.
///
/// Returns `None` for `media` assets, which have no track.
pub fn drop_asset(
    store: &mut TimelineStore,
    asset: &AssetDescriptor,
    seconds: TimeSec,
    total_seconds: TimeSec,
) -> Option<DropOutcome> {
    let t = clamp_time(seconds, 0.0, total_seconds);
    match asset {
        AssetDescriptor::Audio(audio) => Some(drop_audio(store, audio, t)),
        AssetDescriptor::Video(video) => Some(drop_video(store, video, t)),
        AssetDescriptor::Media(media) => {
            debug!("Ignoring drop of media asset {}", media.id);
            None
        }
    }
}

fn drop_audio(store: &mut TimelineStore, asset: &AudioAsset, t: TimeSec) -> DropOutcome {
    let clip = AudioClip {
        id: format!("a-{}-{}", asset.id, ulid::Ulid::new()),
        asset_id: asset.id.clone(),
        name: asset.name.clone(),
        start: t,
        duration: store.settings().default_audio_seconds,
        src: asset.src.clone(),
    };
    let key = ClipKey::audio(&clip.id);
    info!("Dropped audio asset {} at {:.3}s", asset.id, t);
    store.add_audio_clip(clip);
    DropOutcome {
        clip: key,
        segment_id: None,
        split: None,
    }
}

fn drop_video(store: &mut TimelineStore, asset: &VideoAsset, t: TimeSec) -> DropOutcome {
    let fallback = store.settings().fallback_video_seconds;
    let min_visible = store.settings().min_clip_seconds;

    let segment = store.segments().iter().find(|s| s.id == asset.id);
    let duration = match segment {
        Some(seg) => seg.safe_duration(fallback),
        None => safe_duration(asset.duration_seconds, fallback),
    };
    let segment_id = segment.map(|s| s.id.clone());

    let clip = VideoClip {
        id: format!("v-{}-{}", asset.id, ulid::Ulid::new()),
        segment_id: asset.id.clone(),
        title: asset.name.clone(),
        src: asset.src.clone(),
        start: t,
        duration,
        trim_start: 0.0,
        trim_end: 0.0,
    };
    let key = ClipKey::video(&clip.id);

    let mut split = None;
    store.update(|timeline| {
        let report = insert_video_clip(&mut timeline.video_clips, clip, min_visible);
        split = report.split;
        report.changes
    });

    info!(
        "Dropped video asset {} ({:.3}s) at {:.3}s{}",
        asset.id,
        duration,
        t,
        if split.is_some() { ", split" } else { "" }
    );
    DropOutcome {
        clip: key,
        segment_id,
        split,
    }
}

/// What [`insert_video_clip`] did
#[derive(Clone, Debug, PartialEq)]
pub struct InsertReport {
    /// Where the clip actually landed
    pub insert_at: TimeSec,
    pub split: Option<(ClipId, ClipId)>,
    pub changes: Vec<StateChange>,
}

/// Inserts `clip` at `clip.start` into the video track.
///
/// If the point lies strictly inside another clip's visible window and both
/// remainders are at least `min_visible`, that clip is split around the new
/// one. Otherwise the insertion point moves to the overlapped clip's visible
/// end. Every clip whose visible start is at or after the insertion point
/// shifts right by `clip.duration`.
pub fn insert_video_clip(
    clips: &mut Vec<VideoClip>,
    mut clip: VideoClip,
    min_visible: TimeSec,
) -> InsertReport {
    let d = clip.duration;
    let mut insert_at = clip.start.max(0.0);
    let mut changes = Vec::new();

    let overlapped = clips
        .iter()
        .filter(|c| c.visible_range().strictly_contains(insert_at))
        .min_by(|a, b| a.visible_start().total_cmp(&b.visible_start()))
        .cloned();

    let mut split_left: Option<ClipId> = None;
    let mut split_right: Option<VideoClip> = None;
    if let Some(orig) = overlapped {
        let TimeRange { start_sec: vs, end_sec: ve } = orig.visible_range();
        if insert_at - vs >= min_visible && ve - insert_at >= min_visible {
            if let Some(left) = clips.iter_mut().find(|c| c.id == orig.id) {
                left.trim_end = (orig.frame_end() - insert_at).max(0.0);
            }
            split_left = Some(orig.id.clone());
            split_right = Some(VideoClip {
                id: format!("v-{}-{}", orig.segment_id, ulid::Ulid::new()),
                start: orig.start + d,
                trim_start: (insert_at - orig.start).max(0.0),
                ..orig.clone()
            });
            changes.push(StateChange::ClipModified {
                clip_id: orig.id.clone(),
            });
        } else {
            debug!(
                "Remainders too short to split {}, inserting at its end {:.3}s",
                orig.id, ve
            );
            insert_at = ve;
        }
    }

    let threshold = insert_at - TIME_EPSILON;
    for c in clips.iter_mut() {
        if split_left.as_deref() == Some(c.id.as_str()) {
            continue;
        }
        if c.visible_start() >= threshold {
            c.start += d;
            changes.push(StateChange::ClipModified {
                clip_id: c.id.clone(),
            });
        }
    }

    let split = match (split_left, split_right) {
        (Some(left), Some(right)) => {
            let right_id = right.id.clone();
            changes.push(StateChange::ClipCreated {
                clip_id: right_id.clone(),
            });
            clips.push(right);
            Some((left, right_id))
        }
        _ => None,
    };

    clip.start = insert_at;
    clip.trim_start = 0.0;
    clip.trim_end = 0.0;
    changes.push(StateChange::ClipCreated {
        clip_id: clip.id.clone(),
    });
    clips.push(clip);

    InsertReport {
        insert_at,
        split,
        changes,
    }
}
