//! Snap-to-anchor search for move drags

use crate::core::TimeSec;

/// Finds the delta that lands the group's start or end edge on an anchor.
///
/// Both edges (`group_start + delta`, `group_end + delta`) are tested against
/// every anchor. The smallest correction within `threshold` wins; ties keep the
/// first candidate found. Returns `None` when nothing is close enough.
pub fn snap_delta(
    delta: TimeSec,
    group_start: TimeSec,
    group_end: TimeSec,
    anchors: &[TimeSec],
    threshold: TimeSec,
) -> Option<TimeSec> {
    let after_start = group_start + delta;
    let after_end = group_end + delta;

    let mut best: Option<TimeSec> = None;
    let mut best_abs = f64::INFINITY;
    for &anchor in anchors {
        for edge in [after_start, after_end] {
            let correction = anchor - edge;
            let abs = correction.abs();
            if abs <= threshold && abs < best_abs {
                best_abs = abs;
                best = Some(delta + correction);
            }
        }
    }
    best
}
