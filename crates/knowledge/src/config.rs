//! Knowledge configuration management.
//!
//! Lives under the `knowledge:` key of the same YAML file `AppConfig`
//! reads; every field has a default, so the section may be absent.

use crate::chunk::ChunkingConfig;
use crate::embeddings::EmbeddingConfig;
use crate::error::{KnowledgeError, KnowledgeResult};
use crate::vector_index::DistanceMetric;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks returned per question when the caller does not say
    pub top_k: usize,

    /// Distance used to rank chunks
    pub metric: DistanceMetric,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            metric: DistanceMetric::SquaredL2,
        }
    }
}

/// Chunking, embedding and retrieval configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    knowledge: Option<KnowledgeConfig>,
}

impl KnowledgeConfig {
    /// Override the embedding provider and model.
    pub fn with_embedding_overrides(mut self, provider: Option<String>, model: Option<String>) -> Self {
        if let Some(provider) = provider {
            self.embedding.provider = provider;
        }
        if let Some(model) = model {
            self.embedding.model = model;
        }
        self
    }

    /// Check every section.
    pub fn validate(&self) -> KnowledgeResult<()> {
        self.chunking.validate()?;
        self.embedding.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(KnowledgeError::InvalidConfig(
                "retrieval top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load the knowledge configuration.
///
/// Reads the `knowledge:` section of `path` when the file exists, otherwise
/// starts from defaults. `DOCQA_EMBEDDING_PROVIDER` and
/// `DOCQA_EMBEDDING_MODEL` override the embedding settings.
pub fn load_config(path: &Path) -> AppResult<KnowledgeConfig> {
    let config = if path.exists() {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", path, e))
        })?;
        let config = parse_config(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", path, e))
        })?;
        tracing::debug!("Loaded knowledge config from {:?}", path);
        config
    } else {
        tracing::debug!("No config file at {:?}, using default knowledge config", path);
        KnowledgeConfig::default()
    };

    let config = config.with_embedding_overrides(
        std::env::var("DOCQA_EMBEDDING_PROVIDER").ok(),
        std::env::var("DOCQA_EMBEDDING_MODEL").ok(),
    );
    config.validate()?;
    Ok(config)
}

/// Parse the `knowledge:` section out of a full YAML document.
pub fn parse_config(yaml: &str) -> Result<KnowledgeConfig, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(KnowledgeConfig::default());
    }
    let file: ConfigFile = serde_yaml::from_str(yaml)?;
    Ok(file.knowledge.unwrap_or_default())
}
