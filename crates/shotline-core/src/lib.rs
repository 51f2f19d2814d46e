//! Shotline Core Library
//!
//! Timeline editing engine for storyboard-driven AI short videos.
//! Holds the two-track timeline (video clips tied to storyboard segments,
//! free-form audio clips), the drag-and-drop insertion logic, trim and move
//! interactions, keyboard bindings and viewport sync.
//!
//! ## Host Integration
//!
//! The engine has no rendering or DOM of its own. A host forwards its props
//! and input events to [`editor::TimelineEditor`], performs the returned
//! [`editor::HostEffect`]s and persists the `{videoClips, audioClips}` pair it
//! receives through the store's change notifications.

pub mod core;
pub mod editor;

pub use editor::{HostEffect, Playhead, TimelineEditor};
