//! Derived timeline geometry
//!
//! Pure functions mapping time values to track pixels. Nothing here holds state;
//! the store and the viewport recompute these on demand.

use serde::{Deserialize, Serialize};

use super::models::{Timeline, VideoClip};
use crate::core::settings::TimelineSettings;
use crate::core::TimeSec;

/// Snapshot of the derived axis values
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMetrics {
    pub px_per_second: f64,
    pub viewport_seconds: TimeSec,
    pub total_seconds: TimeSec,
    pub width_px: f64,
}

impl TimelineMetrics {
    pub fn compute(
        timeline: &Timeline,
        px_per_second: f64,
        viewport_seconds: TimeSec,
        settings: &TimelineSettings,
    ) -> Self {
        let total = total_seconds(timeline, viewport_seconds, settings);
        Self {
            px_per_second,
            viewport_seconds,
            total_seconds: total,
            width_px: width_px(total, px_per_second, settings),
        }
    }
}

/// Length of the time axis.
///
/// The furthest clip end on either track is ceiled, floored at
/// `min_total_seconds`, padded by the tail and finally widened to the viewport.
pub fn total_seconds(
    timeline: &Timeline,
    viewport_seconds: TimeSec,
    settings: &TimelineSettings,
) -> TimeSec {
    let base = settings.min_total_seconds.max(timeline.content_end().ceil());
    (base + settings.tail_padding_seconds).max(viewport_seconds)
}

/// Scrollable width of the track area in pixels
pub fn width_px(total_seconds: TimeSec, px_per_second: f64, settings: &TimelineSettings) -> f64 {
    let content = settings.track_offset_px
        + settings.track_right_padding_px
        + (total_seconds * px_per_second).round();
    settings.min_width_px.max(content)
}

/// Seconds visible in a container of `width_px`, or 0 before the container is measured
pub fn viewport_seconds(width_px: f64, px_per_second: f64, settings: &TimelineSettings) -> TimeSec {
    if width_px > 0.0 && px_per_second > 0.0 {
        settings.min_total_seconds.max((width_px / px_per_second).ceil())
    } else {
        0.0
    }
}

/// Pixel offset of a time value inside the scroll content
pub fn seconds_to_px(seconds: TimeSec, px_per_second: f64, settings: &TimelineSettings) -> f64 {
    settings.track_offset_px + seconds * px_per_second
}

/// Time value under a content-space pixel offset (unclamped)
pub fn px_to_seconds(px: f64, px_per_second: f64, settings: &TimelineSettings) -> TimeSec {
    settings.px_to_seconds(px - settings.track_offset_px, px_per_second)
}

/// Rendered rectangle of a video clip
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipGeometry {
    /// Left edge of the visible (trimmed) window
    pub left_px: f64,
    pub width_px: f64,
    /// Left edge of the full media frame, including trimmed-away parts
    pub frame_left_px: f64,
    pub frame_width_px: f64,
}

pub fn clip_geometry(clip: &VideoClip, px_per_second: f64, settings: &TimelineSettings) -> ClipGeometry {
    ClipGeometry {
        left_px: seconds_to_px(clip.visible_start(), px_per_second, settings),
        width_px: (clip.visible_len() * px_per_second).max(0.0),
        frame_left_px: seconds_to_px(clip.start, px_per_second, settings),
        frame_width_px: (clip.duration * px_per_second).max(0.0),
    }
}
