//! Error types for docqa.
//!
//! This module defines the unified error enum that the CLI surfaces to the
//! user. Library crates keep their own closed error taxonomies and convert
//! into `AppError` at the boundary.

use thiserror::Error;

/// Unified error type for docqa.
///
/// All command handlers return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Chunking, embedding, index and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Text source errors (PDF extraction, transcripts, pasted text)
    #[error("Source error: {0}")]
    Source(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
