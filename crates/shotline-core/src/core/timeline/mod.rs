//! Timeline Module
//!
//! Two-track timeline (video + audio) for storyboard-driven short videos:
//! data model, state store, drop ingestion, pointer interaction, keyboard
//! bindings and viewport sync.

mod ingest;
mod interaction;
mod keyboard;
mod markers;
mod metrics;
mod models;
mod selection;
mod snap;
mod store;
mod validate;
mod viewport;

pub use ingest::*;
pub use interaction::*;
pub use keyboard::*;
pub use markers::*;
pub use metrics::{
    clip_geometry, px_to_seconds, seconds_to_px, total_seconds, viewport_seconds, width_px,
    ClipGeometry, TimelineMetrics,
};
pub use models::*;
pub use selection::*;
pub use snap::*;
pub use store::*;
pub use validate::*;
pub use viewport::*;
