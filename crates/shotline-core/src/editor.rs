//! Timeline Editor
//!
//! Host-facing facade over the store, selection, interaction controller and
//! viewport. The host forwards its props and DOM events here and acts on the
//! returned [`HostEffect`]s; timeline changes reach it through
//! [`TimelineEditor::subscribe`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::settings::TimelineSettings;
use crate::core::timeline::{
    drop_asset, map_key, parse_transfer, InitOutcome, InteractionController, KeyAction, KeyContext,
    KeyInput, ListenerId, PointerDownOutcome, PointerInput, Selection, SessionEnd, Segment,
    Timeline, TimelineChanged, TimelineMetrics, TimelineStore, ViewportState, ViewportSync,
};
use crate::core::{SegmentId, TimeSec};

// =============================================================================
// Host Effects
// =============================================================================

/// Something the host must do in response to an event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostEffect {
    /// Report a new active segment
    SelectSegment { segment_id: SegmentId },
    Seek { seconds: TimeSec },
    SeekStart,
    SeekEnd,
    ScrollTo { left_px: f64, smooth: bool },
    RequestAnimationFrame,
    CancelAnimationFrame,
    /// Focus the keyboard scope so key bindings reach the editor
    Focus,
}

/// Live playhead as reported by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playhead {
    pub seconds: TimeSec,
    pub active: bool,
}

impl Playhead {
    /// Playhead seconds when active and finite
    pub fn position(&self) -> Option<TimeSec> {
        (self.active && self.seconds.is_finite()).then_some(self.seconds)
    }
}

// =============================================================================
// Editor
// =============================================================================

pub struct TimelineEditor {
    store: TimelineStore,
    selection: Selection,
    controller: InteractionController,
    viewport: ViewportState,
    sync: ViewportSync,
    active_id: Option<SegmentId>,
    playhead: Playhead,
    seek_enabled: bool,
    /// Pointer id of the seek-layer drag, when one is running
    seek_session: Option<Option<i32>>,
    drag_over: bool,
}

impl TimelineEditor {
    pub fn new(mut settings: TimelineSettings) -> Self {
        settings.normalize();
        let viewport = ViewportState::new(&settings);
        Self {
            store: TimelineStore::new(settings),
            selection: Selection::new(),
            controller: InteractionController::new(),
            viewport,
            sync: ViewportSync::new(),
            active_id: None,
            playhead: Playhead::default(),
            seek_enabled: false,
            seek_session: None,
            drag_over: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn settings(&self) -> &TimelineSettings {
        self.store.settings()
    }

    pub fn store(&self) -> &TimelineStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TimelineStore {
        &mut self.store
    }

    pub fn timeline(&self) -> &Timeline {
        self.store.timeline()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn playhead(&self) -> Playhead {
        self.playhead
    }

    pub fn is_interacting(&self) -> bool {
        self.controller.is_interacting()
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn metrics(&self) -> TimelineMetrics {
        self.store
            .metrics(self.viewport.px_per_second, self.viewport.viewport_seconds)
    }

    pub fn total_seconds(&self) -> TimeSec {
        self.store.total_seconds(self.viewport.viewport_seconds)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TimelineChanged) + 'static) -> ListenerId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    // =========================================================================
    // Props
    // =========================================================================

    /// Applies the timeline key, segments and persisted timeline. A key that
    /// was already applied leaves the current edits alone.
    pub fn load(
        &mut self,
        key: Option<&str>,
        segments: Vec<Segment>,
        persisted: Option<Timeline>,
    ) -> (Option<InitOutcome>, Vec<HostEffect>) {
        let Some(outcome) = self.store.apply_key(key, segments, persisted) else {
            return (None, Vec::new());
        };
        self.selection.clear();
        let mut effects = Vec::new();
        if let Some(end) = self.controller.cancel() {
            push_session_end(&mut effects, end);
        }
        effects.extend(self.follow_active());
        (Some(outcome), effects)
    }

    /// Accepts a new segment list. Duration sync is held back while clips are
    /// selected or an external drag hovers the timeline.
    pub fn set_segments(&mut self, segments: Vec<Segment>) -> Vec<HostEffect> {
        let sync_allowed = self.selection.is_empty() && !self.drag_over;
        if self.store.set_segments(segments, sync_allowed) {
            self.selection.retain_existing(self.store.timeline());
        }
        self.follow_active()
    }

    pub fn set_active_id(&mut self, id: &str) -> Vec<HostEffect> {
        if self.active_id.as_deref() == Some(id) {
            return Vec::new();
        }
        self.active_id = Some(id.to_string());
        self.follow_active()
    }

    pub fn set_seek_enabled(&mut self, enabled: bool) {
        self.seek_enabled = enabled;
    }

    /// Records the host's playhead and recenters the viewport when it drifts
    /// out of view. `now_ms` drives the follow throttle.
    pub fn set_playhead(&mut self, seconds: TimeSec, active: bool, now_ms: f64) -> Vec<HostEffect> {
        self.playhead = Playhead { seconds, active };
        if !active {
            return Vec::new();
        }
        self.sync
            .follow_playhead(seconds, now_ms, &self.viewport, self.store.settings())
            .map(|req| HostEffect::ScrollTo {
                left_px: req.left_px,
                smooth: req.smooth,
            })
            .into_iter()
            .collect()
    }

    pub fn set_viewport(&mut self, container_left_px: f64, client_width_px: f64) -> Vec<HostEffect> {
        self.viewport
            .resize(container_left_px, client_width_px, self.store.settings());
        Vec::new()
    }

    pub fn set_scroll_left(&mut self, scroll_left_px: f64) -> Vec<HostEffect> {
        self.viewport.scroll_left_px = scroll_left_px.max(0.0);
        Vec::new()
    }

    fn follow_active(&mut self) -> Vec<HostEffect> {
        let Some(active_id) = self.active_id.as_deref() else {
            return Vec::new();
        };
        self.sync
            .follow_active(
                active_id,
                self.store.video_clips(),
                self.controller.is_interacting(),
                &self.viewport,
                self.store.settings(),
            )
            .map(|req| HostEffect::ScrollTo {
                left_px: req.left_px,
                smooth: req.smooth,
            })
            .into_iter()
            .collect()
    }

    // =========================================================================
    // Pointer Sessions
    // =========================================================================

    pub fn pointer_down_video(&mut self, input: &PointerInput) -> Vec<HostEffect> {
        let outcome =
            self.controller
                .pointer_down_video(&self.store, &mut self.selection, input, &self.viewport);
        pointer_down_effects(outcome)
    }

    pub fn pointer_down_audio(&mut self, input: &PointerInput) -> Vec<HostEffect> {
        let outcome =
            self.controller
                .pointer_down_audio(&self.store, &mut self.selection, input, &self.viewport);
        pointer_down_effects(outcome)
    }

    pub fn pointer_move(&mut self, input: &PointerInput) -> Vec<HostEffect> {
        if self.controller.pointer_move(input) {
            vec![HostEffect::RequestAnimationFrame]
        } else {
            Vec::new()
        }
    }

    /// Runs the pending recomputation of the active drag
    pub fn animation_frame(&mut self) -> Vec<HostEffect> {
        match self.controller.animation_frame(&mut self.store, &self.viewport) {
            Some(frame) => frame
                .seek
                .map(|seconds| HostEffect::Seek { seconds })
                .into_iter()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn pointer_up(&mut self, pointer_id: Option<i32>) -> Vec<HostEffect> {
        let mut effects = Vec::new();
        if let Some(end) = self.controller.pointer_up(pointer_id) {
            push_session_end(&mut effects, end);
        }
        effects
    }

    // =========================================================================
    // Seek Layer
    // =========================================================================

    fn seek_allowed(&self) -> bool {
        self.seek_enabled && self.playhead.position().is_some()
    }

    pub fn seek_pointer_down(&mut self, input: &PointerInput) -> Vec<HostEffect> {
        if !self.seek_allowed() || self.seek_session.is_some() {
            return Vec::new();
        }
        self.seek_session = Some(input.pointer_id);
        let seconds = self.seek_seconds(input.client_x);
        vec![HostEffect::SeekStart, HostEffect::Seek { seconds }]
    }

    pub fn seek_pointer_move(&mut self, input: &PointerInput) -> Vec<HostEffect> {
        match self.seek_session {
            Some(id) if id.is_none() || id == input.pointer_id => {
                let seconds = self.seek_seconds(input.client_x);
                vec![HostEffect::Seek { seconds }]
            }
            _ => Vec::new(),
        }
    }

    pub fn seek_pointer_up(&mut self, pointer_id: Option<i32>) -> Vec<HostEffect> {
        match self.seek_session {
            Some(id) if id.is_none() || id == pointer_id => {
                self.seek_session = None;
                vec![HostEffect::SeekEnd]
            }
            _ => Vec::new(),
        }
    }

    fn seek_seconds(&self, client_x: f64) -> TimeSec {
        self.viewport
            .seek_seconds(client_x, self.total_seconds(), self.store.settings())
    }

    // =========================================================================
    // Drag and Drop
    // =========================================================================

    pub fn drag_over(&mut self) -> Vec<HostEffect> {
        self.drag_over = true;
        Vec::new()
    }

    pub fn drag_leave(&mut self) -> Vec<HostEffect> {
        self.drag_over = false;
        Vec::new()
    }

    /// Handles a native drop carrying the asset payload in the custom MIME
    /// type or the `text/plain` fallback. Unparseable payloads are ignored.
    pub fn drop_payload(
        &mut self,
        custom: Option<&str>,
        text_plain: Option<&str>,
        client_x: f64,
    ) -> Vec<HostEffect> {
        self.drag_over = false;
        let asset = match parse_transfer(custom, text_plain) {
            Ok(asset) => asset,
            Err(e) => {
                warn!("Ignoring drop: {}", e);
                return Vec::new();
            }
        };

        let seconds = self
            .viewport
            .seconds_at_client_x(client_x, self.store.settings());
        let total = self.total_seconds();
        let Some(outcome) = drop_asset(&mut self.store, &asset, seconds, total) else {
            return Vec::new();
        };

        self.selection.select_only(outcome.clip);
        let mut effects = vec![HostEffect::Focus];
        if let Some(segment_id) = outcome.segment_id {
            effects.push(HostEffect::SelectSegment { segment_id });
        }
        effects
    }

    // =========================================================================
    // Keyboard & Wheel
    // =========================================================================

    /// Handles a key press. Returns `None` when the key is not bound, so the
    /// host keeps its default behavior; otherwise the host should
    /// `preventDefault` and apply the effects.
    pub fn key_down(&mut self, input: &KeyInput) -> Option<Vec<HostEffect>> {
        let ctx = KeyContext {
            has_selection: !self.selection.is_empty(),
            playhead: self.playhead.position(),
            total_seconds: self.total_seconds(),
        };
        let action = map_key(input, &ctx, self.store.settings())?;
        debug!("Key {:?} -> {:?}", input.key, action);

        let effects = match action {
            KeyAction::DeleteSelection => {
                self.store.remove_clips(self.selection.keys());
                self.selection.clear();
                Vec::new()
            }
            KeyAction::ClearSelection => {
                self.selection.clear();
                Vec::new()
            }
            KeyAction::Seek { seconds } => vec![HostEffect::Seek { seconds }],
            KeyAction::ToggleMarker { seconds } => {
                self.store.toggle_marker(seconds);
                Vec::new()
            }
            KeyAction::Zoom { delta_y } => self.wheel(delta_y),
        };
        Some(effects)
    }

    /// Wheel zoom: positive `delta_y` zooms out
    pub fn wheel(&mut self, delta_y: f64) -> Vec<HostEffect> {
        self.viewport.zoom_by(delta_y, self.store.settings());
        Vec::new()
    }
}

fn pointer_down_effects(outcome: PointerDownOutcome) -> Vec<HostEffect> {
    match outcome {
        PointerDownOutcome::Busy => Vec::new(),
        PointerDownOutcome::Missed { .. } | PointerDownOutcome::Toggled { .. } => {
            vec![HostEffect::Focus]
        }
        PointerDownOutcome::DragStarted { segment_id } => {
            let mut effects = vec![HostEffect::Focus];
            if let Some(segment_id) = segment_id {
                effects.push(HostEffect::SelectSegment { segment_id });
            }
            effects
        }
    }
}

fn push_session_end(effects: &mut Vec<HostEffect>, end: SessionEnd) {
    if end.cancel_frame {
        effects.push(HostEffect::CancelAnimationFrame);
    }
}
