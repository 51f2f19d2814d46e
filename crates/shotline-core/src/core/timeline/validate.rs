//! Timeline invariant checks
//!
//! Used by the store to decide whether a persisted timeline can be restored
//! verbatim, and by the CLI `check` command.

use std::collections::HashSet;

use thiserror::Error;

use super::models::{Segment, Timeline, VideoClip};
use crate::core::{ClipId, SegmentId, TimeSec, TIME_EPSILON};

/// A single broken invariant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineViolation {
    #[error("clip {clip_id} references unknown segment {segment_id}")]
    UnknownSegment {
        clip_id: ClipId,
        segment_id: SegmentId,
    },

    #[error("segment {segment_id} has no clip on the video track")]
    MissingSegment { segment_id: SegmentId },

    #[error("clip {clip_id} has invalid start {start}")]
    InvalidStart { clip_id: ClipId, start: TimeSec },

    #[error("clip {clip_id} has invalid duration {duration}")]
    InvalidDuration { clip_id: ClipId, duration: TimeSec },

    #[error("clip {clip_id} has invalid trims ({trim_start}, {trim_end})")]
    InvalidTrim {
        clip_id: ClipId,
        trim_start: TimeSec,
        trim_end: TimeSec,
    },

    #[error("clip {clip_id} is shorter than the minimum visible length ({visible_len}s)")]
    TooShort { clip_id: ClipId, visible_len: TimeSec },

    #[error("clips {first} and {second} overlap")]
    Overlap { first: ClipId, second: ClipId },
}

/// Checks the video track.
///
/// When `segments` is given, every clip must reference a known segment and
/// every segment must be covered by at least one clip.
pub fn validate_video_clips(
    clips: &[VideoClip],
    segments: Option<&[Segment]>,
    min_visible: TimeSec,
) -> Vec<TimelineViolation> {
    let mut violations = Vec::new();

    if let Some(segments) = segments {
        let known: HashSet<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        let covered: HashSet<&str> = clips.iter().map(|c| c.segment_id.as_str()).collect();

        for clip in clips {
            if !known.contains(clip.segment_id.as_str()) {
                violations.push(TimelineViolation::UnknownSegment {
                    clip_id: clip.id.clone(),
                    segment_id: clip.segment_id.clone(),
                });
            }
        }
        for segment in segments {
            if !covered.contains(segment.id.as_str()) {
                violations.push(TimelineViolation::MissingSegment {
                    segment_id: segment.id.clone(),
                });
            }
        }
    }

    for clip in clips {
        if !clip.start.is_finite() || clip.start < 0.0 {
            violations.push(TimelineViolation::InvalidStart {
                clip_id: clip.id.clone(),
                start: clip.start,
            });
        }
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            violations.push(TimelineViolation::InvalidDuration {
                clip_id: clip.id.clone(),
                duration: clip.duration,
            });
            continue;
        }
        let trims_ok = clip.trim_start.is_finite()
            && clip.trim_end.is_finite()
            && clip.trim_start >= 0.0
            && clip.trim_end >= 0.0;
        if !trims_ok {
            violations.push(TimelineViolation::InvalidTrim {
                clip_id: clip.id.clone(),
                trim_start: clip.trim_start,
                trim_end: clip.trim_end,
            });
            continue;
        }
        if clip.visible_len() < min_visible - TIME_EPSILON {
            violations.push(TimelineViolation::TooShort {
                clip_id: clip.id.clone(),
                visible_len: clip.visible_len(),
            });
        }
    }

    let mut sorted: Vec<&VideoClip> = clips
        .iter()
        .filter(|c| c.start.is_finite() && c.duration.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.visible_start().total_cmp(&b.visible_start()));
    for pair in sorted.windows(2) {
        if pair[1].visible_start() < pair[0].visible_end() - TIME_EPSILON {
            violations.push(TimelineViolation::Overlap {
                first: pair[0].id.clone(),
                second: pair[1].id.clone(),
            });
        }
    }

    violations
}

/// Checks both tracks. Audio clips only need a valid placement; they may overlap.
pub fn validate_timeline(
    timeline: &Timeline,
    segments: Option<&[Segment]>,
    min_visible: TimeSec,
) -> Vec<TimelineViolation> {
    let mut violations = validate_video_clips(&timeline.video_clips, segments, min_visible);

    for clip in &timeline.audio_clips {
        if !clip.start.is_finite() || clip.start < 0.0 {
            violations.push(TimelineViolation::InvalidStart {
                clip_id: clip.id.clone(),
                start: clip.start,
            });
        }
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            violations.push(TimelineViolation::InvalidDuration {
                clip_id: clip.id.clone(),
                duration: clip.duration,
            });
        }
    }

    violations
}
