//! Embedding configuration.

use crate::error::{KnowledgeError, KnowledgeResult};
use serde::{Deserialize, Serialize};

/// Embedding settings, read from the `knowledge.embedding` YAML section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram", "ollama", "gemini"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Service base URL override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum embedding calls in flight during a batch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per text before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Prefix marking document text (prefix-driven models such as nomic-embed)
    #[serde(default)]
    pub document_prefix: Option<String>,

    /// Prefix marking query text
    #[serde(default)]
    pub query_prefix: Option<String>,
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            document_prefix: None,
            query_prefix: None,
        }
    }
}

impl EmbeddingConfig {
    /// Check that the settings describe a usable provider.
    pub fn validate(&self) -> KnowledgeResult<()> {
        if self.dimensions == 0 {
            return Err(KnowledgeError::InvalidConfig(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(KnowledgeError::InvalidConfig(
                "embedding concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(KnowledgeError::InvalidConfig(
                "embedding max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
