//! Shotline Core Engine
//!
//! Timeline data model, state store and interaction algorithms.

pub mod settings;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_destructive;
