//! Engine error type

use thiserror::Error;

/// Errors raised while reconstructing or persisting modifiers
#[derive(Error, Debug)]
pub enum StatError {
    /// A save record carried a modifier type code this build does not know
    #[error("Unsupported modifier type code: {0}")]
    UnsupportedModifierType(i32),
    /// An object id that cannot be used as part of a file name
    #[error("Invalid object id for a save file: {0:?}")]
    InvalidObjectId(String),
    #[error("Failed to access stat save file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize stat save data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for engine operations
pub type StatResult<T> = Result<T, StatError>;
