//! Timeline Settings
//!
//! Every tunable constant of the timeline engine lives here:
//! - Zoom range and step
//! - Trim/snap/deadzone thresholds
//! - Track geometry (offsets, paddings)
//! - Defaults for dropped assets and keyboard nudges
//!
//! Storage location: {dir}/timeline-settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::{CoreError, CoreResult};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "timeline-settings.json";

/// Timeline engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Initial zoom factor (pixels per second)
    #[serde(default = "default_px_per_second")]
    pub px_per_second: f64,
    #[serde(default = "default_min_px_per_second")]
    pub min_px_per_second: f64,
    #[serde(default = "default_max_px_per_second")]
    pub max_px_per_second: f64,
    /// Zoom change per wheel notch / key press
    #[serde(default = "default_zoom_step_px")]
    pub zoom_step_px: f64,

    /// Minimum visible length of a trimmed video clip
    #[serde(default = "default_min_clip_seconds")]
    pub min_clip_seconds: f64,
    /// Snap distance for move drags, in screen pixels
    #[serde(default = "default_snap_threshold_px")]
    pub snap_threshold_px: f64,
    /// Width of the trim handles at each clip edge, in screen pixels
    #[serde(default = "default_edge_handle_px")]
    pub edge_handle_px: f64,
    /// Pointer travel below which the move regime is not re-evaluated
    #[serde(default = "default_move_deadzone_px")]
    pub move_deadzone_px: f64,

    /// Width of the track header column left of time zero
    #[serde(default = "default_track_offset_px")]
    pub track_offset_px: f64,
    #[serde(default = "default_track_right_padding_px")]
    pub track_right_padding_px: f64,
    #[serde(default = "default_min_width_px")]
    pub min_width_px: f64,
    #[serde(default = "default_min_total_seconds")]
    pub min_total_seconds: f64,
    #[serde(default = "default_tail_padding_seconds")]
    pub tail_padding_seconds: f64,

    /// Duration given to a dropped audio asset
    #[serde(default = "default_audio_seconds")]
    pub default_audio_seconds: f64,
    /// Duration used when neither the segment nor the asset knows its length
    #[serde(default = "default_fallback_video_seconds")]
    pub fallback_video_seconds: f64,

    #[serde(default = "default_playhead_nudge_seconds")]
    pub playhead_nudge_seconds: f64,
    #[serde(default = "default_playhead_nudge_large_seconds")]
    pub playhead_nudge_large_seconds: f64,

    /// Left margin kept when auto-scrolling to the active clip
    #[serde(default = "default_auto_scroll_margin_px")]
    pub auto_scroll_margin_px: f64,
    /// Comfort band at each side of the visible window for the playhead
    #[serde(default = "default_playhead_band_px")]
    pub playhead_band_px: f64,
    #[serde(default = "default_playhead_throttle_ms")]
    pub playhead_throttle_ms: f64,
    #[serde(default = "default_playhead_throttle_px")]
    pub playhead_throttle_px: f64,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_px_per_second() -> f64 {
    48.0
}

fn default_min_px_per_second() -> f64 {
    24.0
}

fn default_max_px_per_second() -> f64 {
    192.0
}

fn default_zoom_step_px() -> f64 {
    6.0
}

fn default_min_clip_seconds() -> f64 {
    0.5
}

fn default_snap_threshold_px() -> f64 {
    8.0
}

fn default_edge_handle_px() -> f64 {
    8.0
}

fn default_move_deadzone_px() -> f64 {
    2.0
}

fn default_track_offset_px() -> f64 {
    72.0
}

fn default_track_right_padding_px() -> f64 {
    10.0
}

fn default_min_width_px() -> f64 {
    640.0
}

fn default_min_total_seconds() -> f64 {
    4.0
}

fn default_tail_padding_seconds() -> f64 {
    2.0
}

fn default_audio_seconds() -> f64 {
    3.0
}

fn default_fallback_video_seconds() -> f64 {
    2.0
}

fn default_playhead_nudge_seconds() -> f64 {
    0.2
}

fn default_playhead_nudge_large_seconds() -> f64 {
    1.0
}

fn default_auto_scroll_margin_px() -> f64 {
    120.0
}

fn default_playhead_band_px() -> f64 {
    120.0
}

fn default_playhead_throttle_ms() -> f64 {
    90.0
}

fn default_playhead_throttle_px() -> f64 {
    12.0
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            px_per_second: default_px_per_second(),
            min_px_per_second: default_min_px_per_second(),
            max_px_per_second: default_max_px_per_second(),
            zoom_step_px: default_zoom_step_px(),
            min_clip_seconds: default_min_clip_seconds(),
            snap_threshold_px: default_snap_threshold_px(),
            edge_handle_px: default_edge_handle_px(),
            move_deadzone_px: default_move_deadzone_px(),
            track_offset_px: default_track_offset_px(),
            track_right_padding_px: default_track_right_padding_px(),
            min_width_px: default_min_width_px(),
            min_total_seconds: default_min_total_seconds(),
            tail_padding_seconds: default_tail_padding_seconds(),
            default_audio_seconds: default_audio_seconds(),
            fallback_video_seconds: default_fallback_video_seconds(),
            playhead_nudge_seconds: default_playhead_nudge_seconds(),
            playhead_nudge_large_seconds: default_playhead_nudge_large_seconds(),
            auto_scroll_margin_px: default_auto_scroll_margin_px(),
            playhead_band_px: default_playhead_band_px(),
            playhead_throttle_ms: default_playhead_throttle_ms(),
            playhead_throttle_px: default_playhead_throttle_px(),
        }
    }
}

impl TimelineSettings {
    /// Normalizes and clamps settings so every value is usable.
    ///
    /// Bad values are corrected rather than rejected, so an old or hand-edited
    /// file never leaves the editor without settings.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        self.min_px_per_second = clamp_f64(self.min_px_per_second, 1.0, 1_000.0, 24.0);
        self.max_px_per_second = clamp_f64(
            self.max_px_per_second,
            self.min_px_per_second,
            4_000.0,
            192.0,
        );
        self.px_per_second = clamp_f64(
            self.px_per_second,
            self.min_px_per_second,
            self.max_px_per_second,
            48.0,
        );
        self.zoom_step_px = clamp_f64(self.zoom_step_px, 1.0, 100.0, 6.0);

        self.min_clip_seconds = clamp_f64(self.min_clip_seconds, 0.01, 10.0, 0.5);
        self.snap_threshold_px = clamp_f64(self.snap_threshold_px, 0.0, 64.0, 8.0);
        self.edge_handle_px = clamp_f64(self.edge_handle_px, 0.0, 64.0, 8.0);
        self.move_deadzone_px = clamp_f64(self.move_deadzone_px, 0.0, 32.0, 2.0);

        self.track_offset_px = clamp_f64(self.track_offset_px, 0.0, 1_000.0, 72.0);
        self.track_right_padding_px = clamp_f64(self.track_right_padding_px, 0.0, 1_000.0, 10.0);
        self.min_width_px = clamp_f64(self.min_width_px, 0.0, 100_000.0, 640.0);
        self.min_total_seconds = clamp_f64(self.min_total_seconds, 0.0, 3_600.0, 4.0);
        self.tail_padding_seconds = clamp_f64(self.tail_padding_seconds, 0.0, 600.0, 2.0);

        self.default_audio_seconds = clamp_f64(self.default_audio_seconds, 0.1, 3_600.0, 3.0);
        self.fallback_video_seconds = clamp_f64(self.fallback_video_seconds, 0.1, 3_600.0, 2.0);
        // A fallback clip must still be trimmable.
        if self.fallback_video_seconds <= self.min_clip_seconds {
            self.fallback_video_seconds = self.min_clip_seconds * 2.0;
        }

        self.playhead_nudge_seconds = clamp_f64(self.playhead_nudge_seconds, 0.01, 60.0, 0.2);
        self.playhead_nudge_large_seconds =
            clamp_f64(self.playhead_nudge_large_seconds, 0.01, 600.0, 1.0);

        self.auto_scroll_margin_px = clamp_f64(self.auto_scroll_margin_px, 0.0, 10_000.0, 120.0);
        self.playhead_band_px = clamp_f64(self.playhead_band_px, 0.0, 10_000.0, 120.0);
        self.playhead_throttle_ms = clamp_f64(self.playhead_throttle_ms, 0.0, 10_000.0, 90.0);
        self.playhead_throttle_px = clamp_f64(self.playhead_throttle_px, 0.0, 10_000.0, 12.0);
    }

    /// Converts a screen distance into seconds at the given zoom
    pub fn px_to_seconds(&self, px: f64, px_per_second: f64) -> f64 {
        if px_per_second > 0.0 {
            px / px_per_second
        } else {
            0.0
        }
    }
}

fn clamp_f64(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        return fallback.clamp(min, max.max(min));
    }
    value.clamp(min, max.max(min))
}

/// Settings manager for loading, saving, and resetting settings
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager rooted at the given directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            settings_path: dir.as_ref().join(SETTINGS_FILE),
        }
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or invalid
    pub fn load(&self) -> TimelineSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load timeline settings, using defaults: {}", e);
                TimelineSettings::default()
            }
        }
    }

    fn try_load(&self) -> CoreResult<TimelineSettings> {
        if !self.settings_path.exists() {
            info!("Timeline settings file not found, using defaults");
            return Ok(TimelineSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path)?;
        let mut settings = serde_json::from_str::<TimelineSettings>(&content)?;

        if settings.version < SETTINGS_VERSION {
            info!(
                "Migrating timeline settings from version {} to {}",
                settings.version, SETTINGS_VERSION
            );
            settings.version = SETTINGS_VERSION;
        }

        settings.normalize();
        Ok(settings)
    }

    /// Save settings to disk using atomic write (temp file + rename)
    pub fn save(&self, settings: &TimelineSettings) -> CoreResult<TimelineSettings> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut normalized = settings.clone();
        normalized.normalize();

        let content = serde_json::to_string_pretty(&normalized)?;

        let temp_path = self.settings_path.with_extension("json.tmp");
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if cfg!(windows) && self.settings_path.exists() {
            // Windows: rename does not overwrite.
            fs::remove_file(&self.settings_path)?;
        }
        fs::rename(&temp_path, &self.settings_path).map_err(|e| {
            CoreError::SettingsError(format!("Failed to finalize settings file: {}", e))
        })?;

        info!("Timeline settings saved to {:?}", self.settings_path);
        Ok(normalized)
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CoreResult<TimelineSettings> {
        if self.settings_path.exists() {
            fs::remove_file(&self.settings_path)?;
            info!("Timeline settings file deleted");
        }
        Ok(TimelineSettings::default())
    }
}
