//! Replay scripts
//!
//! A script is a JSON-lines file of host events. Each line is one
//! [`ScriptEvent`], tagged by `type`. Blank lines and lines starting with `#`
//! are skipped.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shotline_core::core::timeline::{KeyInput, PointerInput, Segment};
use shotline_core::{HostEffect, TimelineEditor};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Track {
    #[default]
    Video,
    Audio,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScriptEvent {
    PointerDown {
        #[serde(default)]
        track: Track,
        #[serde(flatten)]
        input: PointerInput,
    },
    PointerMove {
        #[serde(flatten)]
        input: PointerInput,
    },
    PointerUp {
        #[serde(default)]
        pointer_id: Option<i32>,
    },
    Frame,
    DragOver,
    DragLeave,
    /// `payload` goes into the custom MIME slot, `text_plain` into the fallback
    Drop {
        #[serde(default)]
        payload: Option<serde_json::Value>,
        #[serde(default)]
        text_plain: Option<String>,
        client_x: f64,
    },
    Key {
        #[serde(flatten)]
        input: KeyInput,
    },
    Wheel {
        delta_y: f64,
    },
    ActiveId {
        id: String,
    },
    Playhead {
        seconds: f64,
        #[serde(default = "default_true")]
        active: bool,
        #[serde(default)]
        now_ms: f64,
    },
    SeekEnabled {
        enabled: bool,
    },
    SeekDown {
        #[serde(flatten)]
        input: PointerInput,
    },
    SeekMove {
        #[serde(flatten)]
        input: PointerInput,
    },
    SeekUp {
        #[serde(default)]
        pointer_id: Option<i32>,
    },
    Resize {
        #[serde(default)]
        container_left_px: f64,
        client_width_px: f64,
    },
    Scroll {
        left_px: f64,
    },
    Segments {
        segments: Vec<Segment>,
    },
}

fn default_true() -> bool {
    true
}

/// Parses a JSON-lines script
pub fn parse_script(content: &str) -> Result<Vec<ScriptEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid script event on line {}", i + 1))
        })
        .collect()
}

/// Feeds one event to the editor and returns the effects the host would act on
pub fn apply_event(editor: &mut TimelineEditor, event: ScriptEvent) -> Vec<HostEffect> {
    match event {
        ScriptEvent::PointerDown { track, input } => match track {
            Track::Video => editor.pointer_down_video(&input),
            Track::Audio => editor.pointer_down_audio(&input),
        },
        ScriptEvent::PointerMove { input } => editor.pointer_move(&input),
        ScriptEvent::PointerUp { pointer_id } => editor.pointer_up(pointer_id),
        ScriptEvent::Frame => editor.animation_frame(),
        ScriptEvent::DragOver => editor.drag_over(),
        ScriptEvent::DragLeave => editor.drag_leave(),
        ScriptEvent::Drop {
            payload,
            text_plain,
            client_x,
        } => {
            let custom = payload.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            editor.drop_payload(custom.as_deref(), text_plain.as_deref(), client_x)
        }
        ScriptEvent::Key { input } => editor.key_down(&input).unwrap_or_default(),
        ScriptEvent::Wheel { delta_y } => editor.wheel(delta_y),
        ScriptEvent::ActiveId { id } => editor.set_active_id(&id),
        ScriptEvent::Playhead {
            seconds,
            active,
            now_ms,
        } => editor.set_playhead(seconds, active, now_ms),
        ScriptEvent::SeekEnabled { enabled } => {
            editor.set_seek_enabled(enabled);
            Vec::new()
        }
        ScriptEvent::SeekDown { input } => editor.seek_pointer_down(&input),
        ScriptEvent::SeekMove { input } => editor.seek_pointer_move(&input),
        ScriptEvent::SeekUp { pointer_id } => editor.seek_pointer_up(pointer_id),
        ScriptEvent::Resize {
            container_left_px,
            client_width_px,
        } => editor.set_viewport(container_left_px, client_width_px),
        ScriptEvent::Scroll { left_px } => editor.set_scroll_left(left_px),
        ScriptEvent::Segments { segments } => editor.set_segments(segments),
    }
}

/// Replays every event in order. A `RequestAnimationFrame` effect is honored
/// right away when `auto_frames` is set, like a host with an idle frame loop.
pub fn replay(editor: &mut TimelineEditor, events: Vec<ScriptEvent>, auto_frames: bool) -> Vec<HostEffect> {
    let total = events.len();
    let mut all_effects = Vec::new();
    for (i, event) in events.into_iter().enumerate() {
        debug!("Event {}/{}: {:?}", i + 1, total, event);
        let mut effects = apply_event(editor, event);
        if auto_frames && effects.contains(&HostEffect::RequestAnimationFrame) {
            effects.extend(editor.animation_frame());
        }
        for effect in &effects {
            debug!("Effect: {:?}", effect);
        }
        all_effects.extend(effects);
    }
    info!("Replayed {} events", total);
    all_effects
}
