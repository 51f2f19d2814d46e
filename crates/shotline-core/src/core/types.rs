//! Shotline Core Type Definitions
//!
//! Defines fundamental types used throughout the engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// ID Types
// =============================================================================

/// Timeline clip identifier (`v-…` for video, `a-…` for audio)
pub type ClipId = String;

/// Host-provided segment (storyboard shot) identifier
pub type SegmentId = String;

/// Library asset identifier carried in drag payloads
pub type AssetId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Tolerance used for every time comparison on the timeline
pub const TIME_EPSILON: TimeSec = 1e-3;

/// Returns true when two times are equal within [`TIME_EPSILON`]
pub fn approx_eq(a: TimeSec, b: TimeSec) -> bool {
    (a - b).abs() < TIME_EPSILON
}

/// Clamps `value` into `[min, max]`, mapping NaN to `min`.
///
/// Unlike `f64::clamp` this never panics when `min > max`; `min` wins.
pub fn clamp_time(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.min(max).max(min)
}

/// Returns `value` when finite and non-negative, otherwise 0
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// =============================================================================
// Time Range
// =============================================================================

/// Half-open time range `[start_sec, end_sec)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
}

impl TimeRange {
    pub fn new(start_sec: TimeSec, end_sec: TimeSec) -> Self {
        if start_sec > end_sec {
            warn!(
                "TimeRange created with start > end ({} > {}), swapping",
                start_sec, end_sec
            );
            return Self {
                start_sec: end_sec,
                end_sec: start_sec,
            };
        }
        Self { start_sec, end_sec }
    }

    /// Returns duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    /// Checks if a given time is within the closed range
    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start_sec && time <= self.end_sec
    }

    /// Checks if a time lies strictly inside the range, away from both edges
    pub fn strictly_contains(&self, time: TimeSec) -> bool {
        time > self.start_sec + TIME_EPSILON && time < self.end_sec - TIME_EPSILON
    }

    /// Checks if two ranges overlap by more than [`TIME_EPSILON`]
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_sec < other.end_sec - TIME_EPSILON
            && other.start_sec < self.end_sec - TIME_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_swaps_inverted_bounds() {
        let range = TimeRange::new(10.0, 5.0);
        assert_eq!(range.start_sec, 5.0);
        assert_eq!(range.end_sec, 10.0);
        assert_eq!(range.duration(), 5.0);
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        let a = TimeRange::new(0.0, 3.0);
        let b = TimeRange::new(3.0, 7.0);
        let c = TimeRange::new(2.5, 4.0);

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_strictly_contains_excludes_edges() {
        let range = TimeRange::new(3.0, 7.0);
        assert!(!range.strictly_contains(3.0));
        assert!(!range.strictly_contains(7.0));
        assert!(range.strictly_contains(5.0));
        assert!(range.contains(3.0));
    }

    #[test]
    fn test_clamp_time_handles_nan_and_inverted_bounds() {
        assert_eq!(clamp_time(f64::NAN, 1.0, 2.0), 1.0);
        assert_eq!(clamp_time(5.0, 0.0, 2.0), 2.0);
        assert_eq!(clamp_time(5.0, 3.0, 2.0), 3.0);
        assert_eq!(clamp_time(-1.0, 0.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(-2.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(1.5), 1.5);
    }
}
