//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::error::{KnowledgeError, KnowledgeResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a text will be used for once embedded.
///
/// Services that train asymmetric models embed documents and queries
/// differently, so every call states which side it is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingIntent {
    /// A chunk being stored
    Document,
    /// A question being searched for
    Query,
}

impl EmbeddingIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Query => "query",
        }
    }
}

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama", "gemini")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Embed one text.
    ///
    /// Failures of any kind (transport, timeout, malformed response,
    /// wrong vector length) surface as `KnowledgeError::EmbeddingService`.
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> KnowledgeResult<Vec<f32>>;
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> KnowledgeResult<Arc<dyn EmbeddingProvider>> {
    config.validate()?;

    match config.provider.as_str() {
        "trigram" => Ok(Arc::new(super::providers::trigram::TrigramProvider::new(
            config.dimensions,
        ))),

        "ollama" => Ok(Arc::new(super::providers::ollama::OllamaProvider::new(
            config,
        )?)),

        "gemini" => {
            let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                KnowledgeError::InvalidConfig(
                    "Gemini embeddings require an API key: set GOOGLE_API_KEY".to_string(),
                )
            })?;
            Ok(Arc::new(super::providers::gemini::GeminiProvider::new(
                config, api_key,
            )?))
        }

        _ => Err(KnowledgeError::InvalidConfig(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama, gemini",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider(&EmbeddingConfig::default(), None).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_ollama_provider_without_network() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            ..Default::default()
        };
        let provider = create_provider(&config, None).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let config = EmbeddingConfig {
            provider: "gemini".to_string(),
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            ..Default::default()
        };
        let err = create_provider(&config, None).unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidConfig(_)));

        let provider = create_provider(&config, Some("key")).unwrap();
        assert_eq!(provider.provider_name(), "gemini");
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "unknown".to_string(),
            model: "test".to_string(),
            ..Default::default()
        };

        let result = create_provider(&config, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&EmbeddingConfig::default(), None).unwrap();
        let embedding = provider
            .embed("test text", EmbeddingIntent::Document)
            .await
            .unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
