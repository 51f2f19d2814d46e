//! Shotline Error Definitions
//!
//! Editing operations are total over their legal inputs and never fail; these
//! errors only surface at the boundaries (payload parsing, file IO, explicit
//! id-addressed calls).

use thiserror::Error;

use super::ClipId;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Invalid asset payload: {0}")]
    InvalidAssetPayload(String),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;
