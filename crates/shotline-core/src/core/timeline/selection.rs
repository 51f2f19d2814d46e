//! Clip selection
//!
//! Ordered set of selected clips. Most recently toggled-in keys come first.

use serde::{Deserialize, Serialize};

use super::models::{ClipKey, ClipKind, Timeline};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    keys: Vec<ClipKey>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[ClipKey] {
        &self.keys
    }

    pub fn contains(&self, key: &ClipKey) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Replaces the selection with exactly one clip
    pub fn select_only(&mut self, key: ClipKey) {
        self.keys.clear();
        self.keys.push(key);
    }

    /// Adds the key when absent, removes it when present.
    /// Returns true when the key is selected afterwards.
    pub fn toggle(&mut self, key: ClipKey) -> bool {
        if let Some(pos) = self.keys.iter().position(|k| *k == key) {
            self.keys.remove(pos);
            false
        } else {
            self.keys.insert(0, key);
            true
        }
    }

    /// Ids of the selected clips of one kind, in selection order
    pub fn ids(&self, kind: ClipKind) -> Vec<String> {
        self.keys
            .iter()
            .filter(|k| k.kind == kind)
            .map(|k| k.id.clone())
            .collect()
    }

    /// Drops keys whose clip no longer exists
    pub fn retain_existing(&mut self, timeline: &Timeline) {
        self.keys.retain(|k| match k.kind {
            ClipKind::Video => timeline.video_clip(&k.id).is_some(),
            ClipKind::Audio => timeline.audio_clip(&k.id).is_some(),
        });
    }
}
