//! Keyboard bindings
//!
//! Maps a key press onto a timeline action. The mapping is pure; the editor
//! applies the action against the store, selection and viewport.

use serde::{Deserialize, Serialize};

use super::interaction::Modifiers;
use crate::core::settings::TimelineSettings;
use crate::core::{clamp_time, TimeSec};

/// A key press as reported by the host
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput {
    /// `KeyboardEvent.key` value, e.g. `"Delete"`, `"ArrowLeft"`, `"m"`
    pub key: String,
    #[serde(flatten)]
    pub modifiers: Modifiers,
    /// Focus is inside an input, textarea or contenteditable
    #[serde(default)]
    pub in_text_input: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }
}

/// Editor state a binding may depend on
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyContext {
    pub has_selection: bool,
    /// Playhead seconds, when the host reports an active playhead
    pub playhead: Option<TimeSec>,
    pub total_seconds: TimeSec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum KeyAction {
    DeleteSelection,
    ClearSelection,
    Seek { seconds: TimeSec },
    ToggleMarker { seconds: TimeSec },
    /// Same sign convention as wheel zoom: positive zooms out
    Zoom { delta_y: f64 },
}

/// Resolves a key press. `None` means the key is not handled and the host
/// should keep its default behavior.
pub fn map_key(input: &KeyInput, ctx: &KeyContext, settings: &TimelineSettings) -> Option<KeyAction> {
    if input.in_text_input {
        return None;
    }

    match input.key.as_str() {
        "Delete" | "Backspace" if ctx.has_selection => Some(KeyAction::DeleteSelection),
        "Escape" if ctx.has_selection => Some(KeyAction::ClearSelection),
        "ArrowLeft" | "ArrowRight" => {
            let playhead = ctx.playhead?;
            let step = if input.modifiers.shift {
                settings.playhead_nudge_large_seconds
            } else {
                settings.playhead_nudge_seconds
            };
            let signed = if input.key == "ArrowLeft" { -step } else { step };
            Some(KeyAction::Seek {
                seconds: clamp_time(playhead + signed, 0.0, ctx.total_seconds),
            })
        }
        "m" | "M" => ctx.playhead.map(|seconds| KeyAction::ToggleMarker { seconds }),
        "+" | "=" => Some(KeyAction::Zoom { delta_y: -1.0 }),
        "-" | "_" => Some(KeyAction::Zoom { delta_y: 1.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(has_selection: bool, playhead: Option<TimeSec>) -> KeyContext {
        KeyContext {
            has_selection,
            playhead,
            total_seconds: 10.0,
        }
    }

    #[test]
    fn test_delete_needs_selection() {
        let settings = TimelineSettings::default();
        let delete = KeyInput::new("Delete");
        assert_eq!(
            map_key(&delete, &ctx(true, None), &settings),
            Some(KeyAction::DeleteSelection)
        );
        assert_eq!(map_key(&delete, &ctx(false, None), &settings), None);
        assert_eq!(
            map_key(&KeyInput::new("Backspace"), &ctx(true, None), &settings),
            Some(KeyAction::DeleteSelection)
        );
    }

    #[test]
    fn test_text_input_focus_ignores_everything() {
        let settings = TimelineSettings::default();
        for key in ["Delete", "Backspace", "Escape", "ArrowLeft", "m", "+"] {
            let input = KeyInput::new(key).in_text_input();
            assert_eq!(map_key(&input, &ctx(true, Some(2.0)), &settings), None, "{key}");
        }
    }

    #[test]
    fn test_arrows_nudge_and_clamp() {
        let settings = TimelineSettings::default();
        let right = map_key(&KeyInput::new("ArrowRight"), &ctx(false, Some(2.0)), &settings);
        assert_eq!(right, Some(KeyAction::Seek { seconds: 2.2 }));

        let left = map_key(&KeyInput::new("ArrowLeft").with_shift(), &ctx(false, Some(0.5)), &settings);
        assert_eq!(left, Some(KeyAction::Seek { seconds: 0.0 }));

        let far = map_key(&KeyInput::new("ArrowRight").with_shift(), &ctx(false, Some(9.5)), &settings);
        assert_eq!(far, Some(KeyAction::Seek { seconds: 10.0 }));
    }

    #[test]
    fn test_playhead_bindings_need_active_playhead() {
        let settings = TimelineSettings::default();
        assert_eq!(map_key(&KeyInput::new("ArrowLeft"), &ctx(false, None), &settings), None);
        assert_eq!(map_key(&KeyInput::new("m"), &ctx(false, None), &settings), None);
        assert_eq!(
            map_key(&KeyInput::new("M"), &ctx(false, Some(3.0)), &settings),
            Some(KeyAction::ToggleMarker { seconds: 3.0 })
        );
    }

    #[test]
    fn test_zoom_keys() {
        let settings = TimelineSettings::default();
        let c = ctx(false, None);
        assert_eq!(
            map_key(&KeyInput::new("="), &c, &settings),
            Some(KeyAction::Zoom { delta_y: -1.0 })
        );
        assert_eq!(
            map_key(&KeyInput::new("_"), &c, &settings),
            Some(KeyAction::Zoom { delta_y: 1.0 })
        );
        assert_eq!(map_key(&KeyInput::new("x"), &c, &settings), None);
    }

    #[test]
    fn test_key_input_from_host_json() {
        let input: KeyInput = serde_json::from_str(r#"{"key":"ArrowLeft","shift":true}"#).unwrap();
        assert!(input.modifiers.shift);
        assert!(!input.in_text_input);
    }
}
