//! Moodlens error types

/// Moodlens error types
#[derive(Debug, thiserror::Error)]
pub enum MoodlensError {
    // Startup errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Per-request errors
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model does not support this operation: {0}")]
    Unsupported(&'static str),

    /// Model output did not have the expected shape or size.
    #[error("data error: {0}")]
    DataError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Moodlens operations
pub type Result<T> = std::result::Result<T, MoodlensError>;
