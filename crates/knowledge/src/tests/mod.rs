//! End-to-end tests for the store-and-retrieve flow, plus the scripted
//! embedding provider they share with unit tests.


use crate::embeddings::{EmbeddingIntent, EmbeddingProvider};
use crate::error::{KnowledgeError, KnowledgeResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Embedding provider with scripted vectors, failures and latency.
///
/// Texts without a scripted vector get [`ScriptedProvider::vector_for`].
pub(crate) struct ScriptedProvider {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
    fail_marker: Option<String>,
    delay: Option<DelayFn>,
    intents: Mutex<Vec<EmbeddingIntent>>,
    calls: AtomicUsize,
}

impl std::fmt::Debug for ScriptedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedProvider")
            .field("dimensions", &self.dimensions)
            .field("fail_marker", &self.fail_marker)
            .finish_non_exhaustive()
    }
}

impl ScriptedProvider {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
            fail_marker: None,
            delay: None,
            intents: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Return `vector` whenever exactly `text` is embedded.
    pub(crate) fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Fail every text containing `marker`.
    pub(crate) fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Sleep before answering, per text.
    pub(crate) fn with_delay(
        mut self,
        delay: impl Fn(&str) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Deterministic fallback vector derived from the text's bytes.
    pub(crate) fn vector_for(text: &str, dimensions: usize) -> Vec<f32> {
        let mut vector = vec![0.0; dimensions];
        for (i, b) in text.bytes().enumerate() {
            vector[i % dimensions] += b as f32 / 255.0;
        }
        vector
    }

    /// Intents seen so far, in call order.
    pub(crate) fn intents(&self) -> Vec<EmbeddingIntent> {
        self.intents.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> KnowledgeResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.intents.lock().unwrap().push(intent);

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(text)).await;
        }

        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(KnowledgeError::EmbeddingService(format!(
                    "scripted failure for {:?}",
                    text
                )));
            }
        }

        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| Self::vector_for(text, self.dimensions)))
    }
}
