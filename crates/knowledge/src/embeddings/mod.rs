//! Embedding engine.
//!
//! Wraps a provider with batch semantics: texts are embedded concurrently,
//! results come back in input order, and a failing text is reported
//! instead of failing the whole batch.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingIntent, EmbeddingProvider};

use crate::chunk::preview;
use crate::error::{KnowledgeError, KnowledgeResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Vectors for the texts of a batch that embedded successfully.
#[derive(Debug, Default)]
pub struct BatchEmbedding {
    /// `(input index, vector)`, ascending by index
    pub embedded: Vec<(usize, Vec<f32>)>,

    /// Texts that could not be embedded, ascending by index
    pub skipped: Vec<SkippedText>,
}

/// A text left out of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedText {
    pub index: usize,
    pub reason: KnowledgeError,
}

/// Provider-agnostic embedding front end.
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    concurrency: usize,
}

impl Embedder {
    /// Wrap a provider; at most `concurrency` calls are in flight per batch.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }

    /// Build the configured provider.
    pub fn from_config(config: &EmbeddingConfig, api_key: Option<&str>) -> KnowledgeResult<Self> {
        let provider = create_provider(config, api_key)?;

        tracing::debug!(
            provider = provider.provider_name(),
            model = provider.model_name(),
            dimensions = provider.dimensions(),
            "Created embedding provider"
        );

        Ok(Self::new(provider, config.concurrency))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Embed every text, skipping the ones that fail.
    ///
    /// Failures are logged and listed in [`BatchEmbedding::skipped`]; the
    /// remaining vectors keep the order of `texts`.
    pub async fn embed_batch(&self, texts: &[String], intent: EmbeddingIntent) -> BatchEmbedding {
        if texts.is_empty() {
            return BatchEmbedding::default();
        }

        tracing::info!(
            "Embedding {} texts using provider '{}' (model: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );

        // Each future owns its provider handle and text so the batch stays `Send`.
        let calls: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let provider = Arc::clone(&self.provider);
                let text = text.clone();
                async move { (index, provider.embed(&text, intent).await) }
            })
            .collect();

        let results: Vec<(usize, KnowledgeResult<Vec<f32>>)> = stream::iter(calls)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut batch = BatchEmbedding::default();
        for (index, result) in results {
            match result {
                Ok(vector) => batch.embedded.push((index, vector)),
                Err(reason) => {
                    tracing::warn!(
                        index,
                        error = %reason,
                        text = %preview(&texts[index], 60),
                        "Failed to embed text, skipping it"
                    );
                    batch.skipped.push(SkippedText { index, reason });
                }
            }
        }

        tracing::debug!(
            embedded = batch.embedded.len(),
            skipped = batch.skipped.len(),
            "Batch embedding finished"
        );

        batch
    }

    /// Embed a single text; any failure is an `EmbeddingService` error.
    pub async fn embed_one(&self, text: &str, intent: EmbeddingIntent) -> KnowledgeResult<Vec<f32>> {
        self.provider
            .embed(text, intent)
            .await
            .map_err(|e| match e {
                KnowledgeError::EmbeddingService(_) => e,
                other => KnowledgeError::EmbeddingService(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ScriptedProvider;
    use std::time::Duration;

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        // Earlier texts take longer, so completion order is reversed.
        let provider = ScriptedProvider::new(4).with_delay(|text| {
            Duration::from_millis(match text {
                "first" => 40,
                "second" => 20,
                _ => 0,
            })
        });
        let embedder = Embedder::new(Arc::new(provider), 3);
        let texts = vec!["first".to_string(), "second".to_string(), "third".to_string()];

        let batch = embedder.embed_batch(&texts, EmbeddingIntent::Document).await;

        let indices: Vec<usize> = batch.embedded.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(batch.skipped.is_empty());
        assert_eq!(batch.embedded[0].1, ScriptedProvider::vector_for("first", 4));
    }

    #[tokio::test]
    async fn test_batch_skips_failures() {
        let provider = ScriptedProvider::new(4).failing_on("broken");
        let embedder = Embedder::new(Arc::new(provider), 2);
        let texts = vec![
            "ok one".to_string(),
            "broken two".to_string(),
            "ok three".to_string(),
        ];

        let batch = embedder.embed_batch(&texts, EmbeddingIntent::Document).await;

        assert_eq!(batch.embedded.len(), 2);
        assert_eq!(batch.embedded[0].0, 0);
        assert_eq!(batch.embedded[1].0, 2);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].index, 1);
        assert!(batch.skipped[0].reason.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let embedder = Embedder::new(Arc::new(ScriptedProvider::new(4)), 2);
        let batch = embedder.embed_batch(&[], EmbeddingIntent::Document).await;
        assert!(batch.embedded.is_empty());
        assert!(batch.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_embed_one_failure_is_fatal() {
        let embedder = Embedder::new(Arc::new(ScriptedProvider::new(4).failing_on("q")), 1);
        let err = embedder
            .embed_one("q", EmbeddingIntent::Query)
            .await
            .unwrap_err();
        assert!(matches!(err, KnowledgeError::EmbeddingService(_)));
    }

    #[tokio::test]
    async fn test_intent_reaches_provider() {
        let provider = Arc::new(ScriptedProvider::new(4));
        let embedder = Embedder::new(provider.clone(), 1);

        embedder
            .embed_batch(&["doc".to_string()], EmbeddingIntent::Document)
            .await;
        embedder.embed_one("question", EmbeddingIntent::Query).await.unwrap();

        assert_eq!(
            provider.intents(),
            vec![EmbeddingIntent::Document, EmbeddingIntent::Query]
        );
    }

    #[tokio::test]
    async fn test_batch_runs_on_spawned_task() {
        let embedder = Embedder::new(Arc::new(ScriptedProvider::new(4)), 2);
        let texts = vec!["one".to_string(), "two".to_string()];

        let batch = tokio::spawn(async move {
            embedder.embed_batch(&texts, EmbeddingIntent::Document).await
        })
        .await
        .unwrap();

        assert_eq!(batch.embedded.len(), 2);
    }

    #[test]
    fn test_from_config_uses_trigram_by_default() {
        let embedder = Embedder::from_config(&EmbeddingConfig::default(), None).unwrap();
        assert_eq!(embedder.provider_name(), "trigram");
        assert_eq!(embedder.dimensions(), 384);
    }
}
