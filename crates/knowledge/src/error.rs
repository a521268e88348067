//! Error taxonomy for the chunk-and-retrieve core.

use docqa_core::AppError;
use thiserror::Error;

/// Errors raised by chunking, embedding, indexing and retrieval.
///
/// Every variant aborts the current operation only. Whatever was stored
/// before the failing call is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KnowledgeError {
    /// Nothing to chunk or embed.
    #[error("Input text is empty")]
    EmptyInput,

    /// A vector's length differs from the dimension the index was built with.
    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Search was attempted before anything was stored.
    #[error("The index is empty; store a document before asking questions")]
    EmptyIndex,

    /// The embedding service failed, timed out or returned garbage.
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    /// Index rows and stored chunk texts went out of step.
    #[error("Index holds {vectors} vectors but the chunk store holds {chunks} texts")]
    PairingInvariant { vectors: usize, chunks: usize },

    /// Chunking, embedding or retrieval settings are unusable.
    #[error("Invalid knowledge configuration: {0}")]
    InvalidConfig(String),
}

impl KnowledgeError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EmbeddingService(_))
    }
}

impl From<KnowledgeError> for AppError {
    fn from(err: KnowledgeError) -> Self {
        match err {
            KnowledgeError::InvalidConfig(msg) => AppError::Config(msg),
            other => AppError::Knowledge(other.to_string()),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type KnowledgeResult<T> = Result<T, KnowledgeError>;
