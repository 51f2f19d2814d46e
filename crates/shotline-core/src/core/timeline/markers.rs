//! Ruler markers
//!
//! A sorted set of time values, deduplicated by approximate equality.

use serde::{Deserialize, Serialize};

use crate::core::{approx_eq, TimeSec};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerSet {
    times: Vec<TimeSec>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker unless one already sits at (approximately) the same time.
    /// Returns true when the set changed.
    pub fn add(&mut self, time: TimeSec) -> bool {
        if !time.is_finite() || self.contains(time) {
            return false;
        }
        let idx = self.times.partition_point(|t| *t < time);
        self.times.insert(idx, time);
        true
    }

    /// Removes every marker approximately equal to `time`
    pub fn remove(&mut self, time: TimeSec) -> bool {
        let before = self.times.len();
        self.times.retain(|t| !approx_eq(*t, time));
        self.times.len() != before
    }

    /// Removes the marker at `time` if present, adds it otherwise.
    /// Returns true when a marker now exists at `time`.
    pub fn toggle(&mut self, time: TimeSec) -> bool {
        if self.remove(time) {
            false
        } else {
            self.add(time)
        }
    }

    pub fn contains(&self, time: TimeSec) -> bool {
        self.times.iter().any(|t| approx_eq(*t, time))
    }

    pub fn clear(&mut self) {
        self.times.clear();
    }

    pub fn as_slice(&self) -> &[TimeSec] {
        &self.times
    }

    pub fn iter(&self) -> impl Iterator<Item = TimeSec> + '_ {
        self.times.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
