//! Timeline Model Definitions
//!
//! Defines Segment, VideoClip, AudioClip and the Timeline pair handed to the host.
//! Clips are stored denormalized: every clip carries its own start, full media
//! duration and trims, so a clip stays valid even if its segment disappears.

use serde::{Deserialize, Serialize};

use crate::core::{AssetId, ClipId, SegmentId, TimeRange, TimeSec};

// =============================================================================
// Segment
// =============================================================================

/// Host-provided logical shot. Read-only to the engine; its order is the
/// source-of-truth order of the video track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: SegmentId,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "videoSrc", skip_serializing_if = "Option::is_none")]
    pub media_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl Segment {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            media_src: None,
            duration_seconds: None,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_media_src(mut self, src: &str) -> Self {
        self.media_src = Some(src.to_string());
        self
    }

    /// Returns the segment's duration, or `fallback` when it is missing,
    /// non-finite or not positive
    pub fn safe_duration(&self, fallback: TimeSec) -> TimeSec {
        safe_duration(self.duration_seconds, fallback)
    }

    /// Returns the trimmed media source when it is non-empty
    pub fn media_src(&self) -> Option<&str> {
        non_empty(self.media_src.as_deref())
    }
}

/// Returns `value` when finite and positive, otherwise `fallback`
pub fn safe_duration(value: Option<f64>, fallback: TimeSec) -> TimeSec {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => fallback,
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Video Clip
// =============================================================================

/// A placed, trimmable instance of a segment on the video track.
///
/// `duration` is the full underlying media length; trimming never changes it.
/// The played portion is the visible interval
/// `[start + trim_start, start + duration - trim_end)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoClip {
    pub id: ClipId,
    pub segment_id: SegmentId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    pub start: TimeSec,
    pub duration: TimeSec,
    #[serde(default)]
    pub trim_start: TimeSec,
    #[serde(default)]
    pub trim_end: TimeSec,
}

impl VideoClip {
    /// Creates an untrimmed clip for a segment, using the deterministic `v-{segmentId}` id
    pub fn seeded(segment: &Segment, start: TimeSec, duration: TimeSec) -> Self {
        Self {
            id: format!("v-{}", segment.id),
            segment_id: segment.id.clone(),
            title: segment.title.clone(),
            src: segment.media_src().map(str::to_string),
            start,
            duration,
            trim_start: 0.0,
            trim_end: 0.0,
        }
    }

    /// Trim at the start, negative values read as zero
    pub fn trim_start(&self) -> TimeSec {
        self.trim_start.max(0.0)
    }

    /// Trim at the end, negative values read as zero
    pub fn trim_end(&self) -> TimeSec {
        self.trim_end.max(0.0)
    }

    pub fn visible_start(&self) -> TimeSec {
        self.start + self.trim_start()
    }

    pub fn visible_end(&self) -> TimeSec {
        self.start + self.duration - self.trim_end()
    }

    pub fn visible_range(&self) -> TimeRange {
        TimeRange {
            start_sec: self.visible_start(),
            end_sec: self.visible_end(),
        }
    }

    pub fn visible_len(&self) -> TimeSec {
        self.visible_end() - self.visible_start()
    }

    /// End of the underlying media frame, ignoring trims
    pub fn frame_end(&self) -> TimeSec {
        self.start + self.duration
    }

    /// Applies a partial update in place
    pub fn apply(&mut self, patch: &VideoClipPatch) {
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(trim_start) = patch.trim_start {
            self.trim_start = trim_start;
        }
        if let Some(trim_end) = patch.trim_end {
            self.trim_end = trim_end;
        }
        if let Some(src) = &patch.src {
            self.src = Some(src.clone());
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
    }
}

/// Partial update for a video clip; `None` fields are left untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoClipPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<TimeSec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeSec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_start: Option<TimeSec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_end: Option<TimeSec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl VideoClipPatch {
    pub fn start(start: TimeSec) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn trim_start(trim_start: TimeSec) -> Self {
        Self {
            trim_start: Some(trim_start),
            ..Self::default()
        }
    }

    pub fn trim_end(trim_end: TimeSec) -> Self {
        Self {
            trim_end: Some(trim_end),
            ..Self::default()
        }
    }
}

// =============================================================================
// Audio Clip
// =============================================================================

/// Audio clip. Audio clips may overlap freely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClip {
    pub id: ClipId,
    pub asset_id: AssetId,
    #[serde(default)]
    pub name: String,
    pub start: TimeSec,
    pub duration: TimeSec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl AudioClip {
    pub fn end(&self) -> TimeSec {
        self.start + self.duration
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start_sec: self.start,
            end_sec: self.end(),
        }
    }

    pub fn apply(&mut self, patch: &AudioClipPatch) {
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
    }
}

/// Partial update for an audio clip
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClipPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<TimeSec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeSec>,
}

impl AudioClipPatch {
    pub fn start(start: TimeSec) -> Self {
        Self {
            start: Some(start),
            duration: None,
        }
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// The full clip set reported to the host after every change
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    #[serde(default)]
    pub video_clips: Vec<VideoClip>,
    #[serde(default)]
    pub audio_clips: Vec<AudioClip>,
}

impl Timeline {
    pub fn new(video_clips: Vec<VideoClip>, audio_clips: Vec<AudioClip>) -> Self {
        Self {
            video_clips,
            audio_clips,
        }
    }

    pub fn video_clip(&self, id: &str) -> Option<&VideoClip> {
        self.video_clips.iter().find(|c| c.id == id)
    }

    pub fn video_clip_mut(&mut self, id: &str) -> Option<&mut VideoClip> {
        self.video_clips.iter_mut().find(|c| c.id == id)
    }

    pub fn audio_clip(&self, id: &str) -> Option<&AudioClip> {
        self.audio_clips.iter().find(|c| c.id == id)
    }

    pub fn audio_clip_mut(&mut self, id: &str) -> Option<&mut AudioClip> {
        self.audio_clips.iter_mut().find(|c| c.id == id)
    }

    /// Furthest `start + duration` across both tracks
    pub fn content_end(&self) -> TimeSec {
        let video = self.video_clips.iter().map(VideoClip::frame_end);
        let audio = self.audio_clips.iter().map(AudioClip::end);
        video.chain(audio).fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.video_clips.is_empty() && self.audio_clips.is_empty()
    }
}

// =============================================================================
// Clip Keys
// =============================================================================

/// Which track a clip lives on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipKind {
    Video,
    Audio,
}

/// Selection key: a clip id qualified by its track
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipKey {
    #[serde(rename = "type")]
    pub kind: ClipKind,
    pub id: ClipId,
}

impl ClipKey {
    pub fn video(id: &str) -> Self {
        Self {
            kind: ClipKind::Video,
            id: id.to_string(),
        }
    }

    pub fn audio(id: &str) -> Self {
        Self {
            kind: ClipKind::Audio,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(start: f64, duration: f64, trim_start: f64, trim_end: f64) -> VideoClip {
        VideoClip {
            id: "v-1".to_string(),
            segment_id: "1".to_string(),
            title: "Shot".to_string(),
            src: None,
            start,
            duration,
            trim_start,
            trim_end,
        }
    }

    #[test]
    fn test_visible_interval() {
        let c = clip(2.0, 5.0, 1.0, 0.5);
        assert_eq!(c.visible_start(), 3.0);
        assert_eq!(c.visible_end(), 6.5);
        assert_eq!(c.visible_len(), 3.5);
        assert_eq!(c.frame_end(), 7.0);
    }

    #[test]
    fn test_negative_trims_read_as_zero() {
        let c = clip(0.0, 4.0, -1.0, -2.0);
        assert_eq!(c.visible_start(), 0.0);
        assert_eq!(c.visible_end(), 4.0);
    }

    #[test]
    fn test_safe_duration() {
        assert_eq!(safe_duration(Some(3.0), 2.0), 3.0);
        assert_eq!(safe_duration(Some(0.0), 2.0), 2.0);
        assert_eq!(safe_duration(Some(f64::INFINITY), 2.0), 2.0);
        assert_eq!(safe_duration(None, 2.0), 2.0);
    }

    #[test]
    fn test_segment_accepts_legacy_video_src() {
        let json = r#"{"id":"s1","title":"Intro","videoSrc":" https://cdn/a.mp4 ","durationSeconds":4}"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.media_src(), Some("https://cdn/a.mp4"));
        assert_eq!(seg.safe_duration(2.0), 4.0);

        let clip = VideoClip::seeded(&seg, 0.0, 4.0);
        assert_eq!(clip.id, "v-s1");
        assert_eq!(clip.src.as_deref(), Some("https://cdn/a.mp4"));
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut c = clip(0.0, 4.0, 0.0, 0.0);
        c.apply(&VideoClipPatch::trim_end(1.0));
        assert_eq!(c.trim_end, 1.0);
        assert_eq!(c.start, 0.0);
        assert_eq!(c.duration, 4.0);
    }

    #[test]
    fn test_timeline_wire_format_is_camel_case() {
        let timeline = Timeline::new(vec![clip(0.0, 3.0, 0.0, 0.0)], vec![]);
        let json = serde_json::to_value(&timeline).unwrap();
        assert!(json.get("videoClips").is_some());
        assert_eq!(json["videoClips"][0]["segmentId"], "1");
        assert_eq!(json["videoClips"][0]["trimStart"], 0.0);
    }

    #[test]
    fn test_clip_key_serializes_type_tag() {
        let key = ClipKey::audio("a-1");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"type":"audio","id":"a-1"}"#);
    }

    #[test]
    fn test_content_end_spans_both_tracks() {
        let audio = AudioClip {
            id: "a-1".to_string(),
            asset_id: "x".to_string(),
            name: "Music".to_string(),
            start: 5.0,
            duration: 3.0,
            src: None,
        };
        let timeline = Timeline::new(vec![clip(0.0, 4.0, 0.0, 1.0)], vec![audio]);
        assert_eq!(timeline.content_end(), 8.0);
    }
}
