//! Viewport & Playhead Sync
//!
//! Zoom and scroll geometry, auto-scroll to the active segment, playhead
//! follow and pointer-to-seek conversion. The host owns the real scroll
//! container; everything here returns scroll requests instead of scrolling.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::metrics::{self, seconds_to_px};
use super::models::VideoClip;
use crate::core::settings::TimelineSettings;
use crate::core::{clamp_time, SegmentId, TimeSec};

/// Request for the host to scroll its track container
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollRequest {
    pub left_px: f64,
    pub smooth: bool,
}

// =============================================================================
// Viewport State
// =============================================================================

/// Zoom factor plus the last known geometry of the host's scroll container
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub px_per_second: f64,
    pub viewport_seconds: TimeSec,
    /// Client-space x of the scroll container's left edge
    pub container_left_px: f64,
    pub scroll_left_px: f64,
    pub client_width_px: f64,
}

impl ViewportState {
    pub fn new(settings: &TimelineSettings) -> Self {
        Self {
            px_per_second: settings.px_per_second,
            viewport_seconds: 0.0,
            container_left_px: 0.0,
            scroll_left_px: 0.0,
            client_width_px: 0.0,
        }
    }

    /// Records a container resize and recomputes `viewport_seconds`
    pub fn resize(&mut self, container_left_px: f64, client_width_px: f64, settings: &TimelineSettings) {
        self.container_left_px = container_left_px;
        self.client_width_px = client_width_px.max(0.0);
        self.viewport_seconds =
            metrics::viewport_seconds(self.client_width_px, self.px_per_second, settings);
    }

    /// Wheel zoom: positive `delta_y` zooms out, negative zooms in.
    /// Returns true when the zoom factor changed.
    pub fn zoom_by(&mut self, delta_y: f64, settings: &TimelineSettings) -> bool {
        if delta_y == 0.0 || delta_y.is_nan() {
            return false;
        }
        let step = if delta_y > 0.0 {
            -settings.zoom_step_px
        } else {
            settings.zoom_step_px
        };
        let next = clamp_time(
            (self.px_per_second + step).round(),
            settings.min_px_per_second,
            settings.max_px_per_second,
        );
        if next == self.px_per_second {
            return false;
        }
        debug!("Zoom {} -> {} px/s", self.px_per_second, next);
        self.px_per_second = next;
        self.viewport_seconds =
            metrics::viewport_seconds(self.client_width_px, self.px_per_second, settings);
        true
    }

    /// Time under a client-space x coordinate, unclamped
    pub fn seconds_at_client_x(&self, client_x: f64, settings: &TimelineSettings) -> TimeSec {
        let x = client_x - self.container_left_px + self.scroll_left_px - settings.track_offset_px;
        settings.px_to_seconds(x, self.px_per_second)
    }

    /// Seek target for a pointer over the seek layer, clamped to the axis
    pub fn seek_seconds(&self, client_x: f64, total_seconds: TimeSec, settings: &TimelineSettings) -> TimeSec {
        clamp_time(self.seconds_at_client_x(client_x, settings), 0.0, total_seconds)
    }
}

// =============================================================================
// Viewport Sync
// =============================================================================

/// Remembers what has already been scrolled to, so each change fires once
#[derive(Clone, Debug, Default)]
pub struct ViewportSync {
    last_active_id: Option<SegmentId>,
    /// (timestamp ms, playhead px) of the last playhead check
    last_playhead_check: Option<(f64, f64)>,
}

impl ViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smooth scroll to the first clip of a newly active segment.
    ///
    /// Fires once per distinct id and never while a drag is in progress. An id
    /// with no clip yet is not remembered, so it fires once the clip appears.
    pub fn follow_active(
        &mut self,
        active_id: &str,
        clips: &[VideoClip],
        interacting: bool,
        viewport: &ViewportState,
        settings: &TimelineSettings,
    ) -> Option<ScrollRequest> {
        if interacting {
            return None;
        }
        let active_id = active_id.trim();
        if active_id.is_empty() || self.last_active_id.as_deref() == Some(active_id) {
            return None;
        }
        let clip = clips.iter().find(|c| c.segment_id == active_id)?;
        self.last_active_id = Some(active_id.to_string());

        let target = (settings.track_offset_px + (clip.start * viewport.px_per_second).round()
            - settings.auto_scroll_margin_px)
            .max(0.0);
        debug!("Auto-scroll to segment {} at {}px", active_id, target);
        Some(ScrollRequest {
            left_px: target,
            smooth: true,
        })
    }

    /// Recenters on the playhead when it leaves the comfort band of the
    /// visible window. Checks are throttled by time and distance.
    pub fn follow_playhead(
        &mut self,
        seconds: TimeSec,
        now_ms: f64,
        viewport: &ViewportState,
        settings: &TimelineSettings,
    ) -> Option<ScrollRequest> {
        let px = playhead_px(seconds, viewport.px_per_second, settings)?;

        if let Some((t, x)) = self.last_playhead_check {
            if now_ms - t < settings.playhead_throttle_ms && (px - x).abs() < settings.playhead_throttle_px {
                trace!("Playhead check throttled");
                return None;
            }
        }
        self.last_playhead_check = Some((now_ms, px));

        let left = viewport.scroll_left_px;
        let right = left + viewport.client_width_px;
        let band = settings.playhead_band_px;
        if px >= left + band && px <= right - band {
            return None;
        }
        let target = (px - viewport.client_width_px / 2.0).round().max(0.0);
        Some(ScrollRequest {
            left_px: target,
            smooth: false,
        })
    }
}

/// Pixel position of the playhead, or `None` for a negative or non-finite time
pub fn playhead_px(seconds: TimeSec, px_per_second: f64, settings: &TimelineSettings) -> Option<f64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(seconds_to_px(seconds, px_per_second, settings))
}
