//! Error types for the core crate

use thiserror::Error;

/// Core data model errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid base64 in state blob: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("state entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
