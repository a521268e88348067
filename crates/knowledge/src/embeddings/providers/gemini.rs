//! Gemini embedding provider (`models/{model}:embedContent`).
//!
//! Intent maps onto the API's task types: documents are embedded with
//! `RETRIEVAL_DOCUMENT`, questions with `RETRIEVAL_QUERY`.

use super::ollama::check_dimensions;
use crate::embeddings::{EmbeddingConfig, EmbeddingIntent, EmbeddingProvider};
use crate::error::{KnowledgeError, KnowledgeResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default Gemini API base URL
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const INITIAL_BACKOFF_MS: u64 = 200;

/// Gemini embedding provider.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    max_retries: u32,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: &'static str,
    output_dimensionality: usize,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

fn task_type(intent: EmbeddingIntent) -> &'static str {
    match intent {
        EmbeddingIntent::Document => "RETRIEVAL_DOCUMENT",
        EmbeddingIntent::Query => "RETRIEVAL_QUERY",
    }
}

impl GeminiProvider {
    pub fn new(config: &EmbeddingConfig, api_key: &str) -> KnowledgeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                KnowledgeError::InvalidConfig(format!(
                    "Failed to create HTTP client for Gemini: {}",
                    e
                ))
            })?;

        Ok(Self {
            client,
            base_url: config
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_GEMINI_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            model: config.model.trim_start_matches("models/").to_string(),
            dimensions: config.dimensions,
            max_retries: config.max_retries.max(1),
        })
    }

    fn request_body<'a>(&self, text: &'a str, intent: EmbeddingIntent) -> EmbedContentRequest<'a> {
        EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![Part { text }],
            },
            task_type: task_type(intent),
            output_dimensionality: self.dimensions,
        }
    }

    async fn embed_once(&self, text: &str, intent: EmbeddingIntent) -> KnowledgeResult<Vec<f32>> {
        let url = format!("{}/models/{}:embedContent", self.base_url, self.model);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(text, intent))
            .send()
            .await
            .map_err(|e| {
                KnowledgeError::EmbeddingService(format!(
                    "Failed to send request to Gemini: {}",
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(KnowledgeError::EmbeddingService(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbedContentResponse = response.json().await.map_err(|e| {
            KnowledgeError::EmbeddingService(format!("Failed to parse Gemini response: {}", e))
        })?;

        check_dimensions(body.embedding.values, self.dimensions)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "gemini", intent = intent.as_str()))]
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> KnowledgeResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(KnowledgeError::EmbeddingService(
                "Cannot embed empty text".to_string(),
            ));
        }

        let mut attempt = 0;
        loop {
            match self.embed_once(text, intent).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        return Err(e);
                    }
                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Gemini embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, self.max_retries, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        let config = EmbeddingConfig {
            provider: "gemini".to_string(),
            model: "models/text-embedding-004".to_string(),
            dimensions: 768,
            ..Default::default()
        };
        GeminiProvider::new(&config, "test-key").unwrap()
    }

    #[test]
    fn test_request_body_carries_task_type() {
        let provider = provider();

        let doc = serde_json::to_value(provider.request_body("chunk", EmbeddingIntent::Document))
            .unwrap();
        assert_eq!(doc["model"], "models/text-embedding-004");
        assert_eq!(doc["taskType"], "RETRIEVAL_DOCUMENT");
        assert_eq!(doc["content"]["parts"][0]["text"], "chunk");
        assert_eq!(doc["outputDimensionality"], 768);

        let query = serde_json::to_value(provider.request_body("q", EmbeddingIntent::Query))
            .unwrap();
        assert_eq!(query["taskType"], "RETRIEVAL_QUERY");
    }

    #[test]
    fn test_response_parsing() {
        let body: EmbedContentResponse =
            serde_json::from_str(r#"{"embedding":{"values":[0.1,0.2,0.3]}}"#).unwrap();
        assert_eq!(body.embedding.values.len(), 3);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let rendered = format!("{:?}", provider());
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("text-embedding-004"));
    }
}
