//! Ollama Embedding Provider
//!
//! Provides semantic embeddings via Ollama's local API using models like nomic-embed-text.
//!
//! # Features
//! - Neural semantic embeddings (768-dim for nomic-embed-text)
//! - Local-first (no API costs, privacy-preserving)
//! - Document/query task prefixes for prefix-trained models
//! - Automatic retry with exponential backoff
//!
//! # Example
//! ```no_run
//! use docqa_knowledge::embeddings::{EmbeddingConfig, EmbeddingIntent, EmbeddingProvider};
//! use docqa_knowledge::embeddings::providers::ollama::OllamaProvider;
//!
//! # async fn run() -> docqa_knowledge::KnowledgeResult<()> {
//! let config = EmbeddingConfig {
//!     provider: "ollama".to_string(),
//!     model: "nomic-embed-text".to_string(),
//!     dimensions: 768,
//!     ..Default::default()
//! };
//!
//! let provider = OllamaProvider::new(&config)?;
//! let embedding = provider.embed("Hello world", EmbeddingIntent::Query).await?;
//! assert_eq!(embedding.len(), 768);
//! # Ok(())
//! # }
//! ```

use crate::embeddings::{EmbeddingConfig, EmbeddingIntent, EmbeddingProvider};
use crate::error::{KnowledgeError, KnowledgeResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default Ollama base URL
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    max_retries: u32,
    document_prefix: String,
    query_prefix: String,
}

/// Request payload for Ollama embeddings API
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: String,
}

/// Response from Ollama embeddings API
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Error response from Ollama API
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider from configuration.
    ///
    /// No request is made here; an unreachable server surfaces on the first
    /// `embed` call. The base URL is, in order: `config.endpoint`, the
    /// `OLLAMA_URL` environment variable, then [`DEFAULT_OLLAMA_URL`].
    pub fn new(config: &EmbeddingConfig) -> KnowledgeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                KnowledgeError::InvalidConfig(format!(
                    "Failed to create HTTP client for Ollama: {}",
                    e
                ))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let (default_doc, default_query) = default_prefixes(&config.model);

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            dimensions: config.dimensions,
            max_retries: config.max_retries.max(1),
            document_prefix: config
                .document_prefix
                .clone()
                .unwrap_or_else(|| default_doc.to_string()),
            query_prefix: config
                .query_prefix
                .clone()
                .unwrap_or_else(|| default_query.to_string()),
        })
    }

    /// Text as sent to the model, with the task prefix for `intent`.
    fn prompt_for(&self, text: &str, intent: EmbeddingIntent) -> String {
        let prefix = match intent {
            EmbeddingIntent::Document => &self.document_prefix,
            EmbeddingIntent::Query => &self.query_prefix,
        };
        format!("{}{}", prefix, text)
    }

    /// Embed single text with retry logic
    #[instrument(skip(self, prompt), fields(text_len = prompt.len(), model = %self.model))]
    async fn embed_with_retries(&self, prompt: String) -> KnowledgeResult<Vec<f32>> {
        let mut attempt = 0;

        loop {
            match self.embed_single(&prompt).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        return Err(e);
                    }

                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, self.max_retries, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    /// Embed single text (no retries)
    async fn embed_single(&self, prompt: &str) -> KnowledgeResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: &self.model,
            prompt: prompt.to_string(),
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                KnowledgeError::EmbeddingService(format!(
                    "Failed to send request to Ollama: {}",
                    e
                ))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|r| r.error)
                .unwrap_or(error_text);

            return Err(KnowledgeError::EmbeddingService(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            KnowledgeError::EmbeddingService(format!("Failed to parse Ollama response: {}", e))
        })?;

        check_dimensions(body.embedding, self.dimensions)
    }
}

/// Task prefixes used when the config does not set any.
fn default_prefixes(model: &str) -> (&'static str, &'static str) {
    if model.contains("nomic-embed") {
        ("search_document: ", "search_query: ")
    } else {
        ("", "")
    }
}

/// Reject vectors whose length differs from the configured dimension.
pub(crate) fn check_dimensions(embedding: Vec<f32>, expected: usize) -> KnowledgeResult<Vec<f32>> {
    if embedding.len() != expected {
        return Err(KnowledgeError::EmbeddingService(format!(
            "Unexpected embedding dimensions: got {}, expected {}",
            embedding.len(),
            expected
        )));
    }
    Ok(embedding)
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "ollama", intent = intent.as_str()))]
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> KnowledgeResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(KnowledgeError::EmbeddingService(
                "Cannot embed empty text".to_string(),
            ));
        }

        self.embed_with_retries(self.prompt_for(text, intent)).await
    }
}
