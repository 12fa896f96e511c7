//! Error Handling
//!
//! Application-wide error type. Extends the core error set with the
//! variants that need the heavier application stack: external engine
//! execution, narrative-service HTTP calls, and the missing/corrupt
//! distinction for persisted result files.

use forceqc_core::CoreError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced task/run/record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A persisted file exists but cannot be parsed as expected.
    /// Distinct from `NotFound` so callers can tell missing from corrupt.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The external analysis engine exited non-zero
    #[error("Analysis engine error: {0}")]
    Engine(String),

    /// The engine reported success but produced no usable result file
    #[error("Missing engine output: {0}")]
    MissingOutput(String),

    /// Narrative generation service errors
    #[error("Narrative service error: {0}")]
    Narrative(String),

    /// HTTP transport errors from the narrative client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a missing-output error
    pub fn missing_output(msg: impl Into<String>) -> Self {
        Self::MissingOutput(msg.into())
    }

    /// Create a narrative-service error
    pub fn narrative(msg: impl Into<String>) -> Self {
        Self::Narrative(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => Self::Config(msg),
            CoreError::Io(e) => Self::Io(e),
            CoreError::Serialization(e) => Self::Serialization(e),
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::NotFound(msg) => Self::NotFound(msg),
            CoreError::Parse(msg) => Self::Decode(msg),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
