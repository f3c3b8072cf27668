//! Engine error taxonomy: client-side validation vs. upstream model failures.

use thiserror::Error;

/// Timestamp format every raw record is expected to carry.
pub const TIMESTAMP_FORMAT_HINT: &str =
    "Invalid timestamp format. Make sure ISO 8601 format is used (e.g. '2025-07-14T10:22:00').";

#[derive(Debug, Error)]
pub enum EngineError {
    /// Batch rejected before any feature was derived.
    #[error("validation failed at row {row}: {message}")]
    Validation { row: usize, message: String },

    /// Risk model or explainer could not load or predict.
    #[error("upstream model error: {0}")]
    UpstreamModel(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn validation(row: usize, message: impl Into<String>) -> Self {
        EngineError::Validation {
            row,
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        EngineError::UpstreamModel(message.into())
    }

    /// HTTP status a service shell should surface for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::Validation { .. } => 422,
            EngineError::UpstreamModel(_) | EngineError::Config(_) => 500,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation { .. })
    }
}

impl From<ort::OrtError> for EngineError {
    fn from(e: ort::OrtError) -> Self {
        EngineError::UpstreamModel(e.to_string())
    }
}
