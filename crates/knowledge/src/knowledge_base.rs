//! Store-and-retrieve orchestration over one in-memory corpus.
//!
//! A [`KnowledgeBase`] pairs a vector index with the chunk texts behind its
//! rows. Both sit behind a single async mutex that every operation holds
//! from start to finish, embedding calls included, so:
//! - row `i` of the index always belongs to text `i` of the store
//! - concurrent stores append in the order they were called
//! - `clear` never lands in the middle of a store or a search

use crate::chunk::{chunk_text, preview, Chunk, ChunkingConfig};
use crate::config::{KnowledgeConfig, RetrievalConfig};
use crate::embeddings::{Embedder, EmbeddingIntent};
use crate::error::{KnowledgeError, KnowledgeResult};
use crate::store::ChunkStore;
use crate::vector_index::{FlatIndex, VectorIndex};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::Mutex;

/// Outcome of storing one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreReport {
    /// Chunks produced from the input
    pub chunks_total: usize,

    /// Chunks embedded and appended
    pub stored: usize,

    /// Chunks left out because their embedding failed
    pub skipped: Vec<SkippedChunk>,
}

/// A chunk that could not be embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedChunk {
    pub ordinal: u32,
    pub preview: String,
    pub reason: String,
}

/// A retrieved chunk with its distance to the question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub row: usize,
    pub distance: f32,
    pub text: String,
}

/// Size of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    /// Rows in the index (equal to stored chunk texts)
    pub rows: usize,

    /// Embedding dimension, once something has been stored
    pub dimension: Option<usize>,
}

/// Index rows and chunk texts, grown and cleared together.
#[derive(Debug, Default)]
struct Corpus {
    index: FlatIndex,
    chunks: ChunkStore,
}

impl Corpus {
    /// Append vectors and their texts as one unit.
    fn append(&mut self, vectors: Vec<Vec<f32>>, texts: Vec<String>) -> KnowledgeResult<()> {
        if vectors.len() != texts.len() {
            return Err(KnowledgeError::PairingInvariant {
                vectors: vectors.len(),
                chunks: texts.len(),
            });
        }

        self.index.add(&vectors)?;
        self.chunks.append(texts);
        self.check_pairing()
    }

    fn check_pairing(&self) -> KnowledgeResult<()> {
        if self.index.len() != self.chunks.len() {
            return Err(KnowledgeError::PairingInvariant {
                vectors: self.index.len(),
                chunks: self.chunks.len(),
            });
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.index.reset();
        self.chunks.clear();
    }
}

/// One session's document memory.
#[derive(Debug)]
pub struct KnowledgeBase {
    embedder: Embedder,
    chunking: ChunkingConfig,
    retrieval: RetrievalConfig,
    corpus: Mutex<Corpus>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new(
        embedder: Embedder,
        chunking: ChunkingConfig,
        retrieval: RetrievalConfig,
    ) -> KnowledgeResult<Self> {
        chunking.validate()?;

        Ok(Self {
            embedder,
            chunking,
            corpus: Mutex::new(Corpus {
                index: FlatIndex::new(retrieval.metric),
                chunks: ChunkStore::new(),
            }),
            retrieval,
        })
    }

    /// Create an empty knowledge base with the configured embedding provider.
    pub fn from_config(config: &KnowledgeConfig, api_key: Option<&str>) -> KnowledgeResult<Self> {
        config.validate()?;
        let embedder = Embedder::from_config(&config.embedding, api_key)?;
        Self::new(embedder, config.chunking.clone(), config.retrieval.clone())
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Default number of chunks per question.
    pub fn default_top_k(&self) -> usize {
        self.retrieval.top_k
    }

    /// Chunk, embed and append a document.
    ///
    /// Chunks whose embedding fails are skipped and listed in the report;
    /// the rest are appended in chunk order.
    ///
    /// # Errors
    /// * `EmptyInput` - the text produced no chunks
    /// * `EmbeddingService` - not a single chunk could be embedded
    /// * `DimensionMismatch` - the provider's vectors do not fit the index
    pub async fn store(&self, text: &str) -> KnowledgeResult<StoreReport> {
        let mut corpus = self.corpus.lock().await;

        let chunks = chunk_text(text, &self.chunking)?;
        self.store_locked(&mut corpus, chunks).await
    }

    /// Embed and append chunks produced elsewhere.
    ///
    /// Same contract as [`store`](Self::store).
    pub async fn store_chunks(&self, chunks: Vec<Chunk>) -> KnowledgeResult<StoreReport> {
        let mut corpus = self.corpus.lock().await;
        self.store_locked(&mut corpus, chunks).await
    }

    async fn store_locked(
        &self,
        corpus: &mut Corpus,
        chunks: Vec<Chunk>,
    ) -> KnowledgeResult<StoreReport> {
        if chunks.is_empty() {
            return Err(KnowledgeError::EmptyInput);
        }

        let start = Instant::now();
        let chunks_total = chunks.len();
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        let batch = self
            .embedder
            .embed_batch(&texts, EmbeddingIntent::Document)
            .await;

        let skipped: Vec<SkippedChunk> = batch
            .skipped
            .iter()
            .map(|s| SkippedChunk {
                ordinal: chunks[s.index].ordinal,
                preview: preview(&texts[s.index], 60),
                reason: s.reason.to_string(),
            })
            .collect();

        if batch.embedded.is_empty() {
            let reason = batch
                .skipped
                .first()
                .map(|s| s.reason.to_string())
                .unwrap_or_default();
            return Err(KnowledgeError::EmbeddingService(format!(
                "none of the {} chunks could be embedded: {}",
                chunks_total, reason
            )));
        }

        let mut texts: Vec<Option<String>> = texts.into_iter().map(Some).collect();
        let (vectors, stored_texts): (Vec<Vec<f32>>, Vec<String>) = batch
            .embedded
            .into_iter()
            .filter_map(|(index, vector)| texts[index].take().map(|text| (vector, text)))
            .unzip();

        let stored = vectors.len();
        corpus.append(vectors, stored_texts)?;

        tracing::info!(
            "Stored {}/{} chunks ({} skipped, {} rows total) in {:.2}s",
            stored,
            chunks_total,
            skipped.len(),
            corpus.index.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(StoreReport {
            chunks_total,
            stored,
            skipped,
        })
    }

    /// Texts of the `k` chunks nearest to `query`, nearest first.
    pub async fn retrieve(&self, query: &str, k: usize) -> KnowledgeResult<Vec<String>> {
        Ok(self
            .retrieve_scored(query, k)
            .await?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Like [`retrieve`](Self::retrieve), with rows and distances.
    ///
    /// # Errors
    /// * `EmptyIndex` - nothing stored yet (checked before embedding)
    /// * `EmbeddingService` - the question could not be embedded
    /// * `DimensionMismatch` - the question vector does not fit the index
    pub async fn retrieve_scored(
        &self,
        query: &str,
        k: usize,
    ) -> KnowledgeResult<Vec<RetrievedChunk>> {
        let corpus = self.corpus.lock().await;

        if corpus.index.is_empty() {
            return Err(KnowledgeError::EmptyIndex);
        }

        let query_vector = self.embedder.embed_one(query, EmbeddingIntent::Query).await?;
        let neighbors = corpus.index.search(&query_vector, k)?;

        let hits: Vec<RetrievedChunk> = neighbors
            .into_iter()
            .filter_map(|n| match corpus.chunks.get(n.row) {
                Some(text) => Some(RetrievedChunk {
                    row: n.row,
                    distance: n.distance,
                    text: text.to_string(),
                }),
                None => {
                    tracing::warn!(
                        row = n.row,
                        stored = corpus.chunks.len(),
                        "Index returned a row with no stored text, dropping it"
                    );
                    None
                }
            })
            .collect();

        if let (Some(first), Some(last)) = (hits.first(), hits.last()) {
            tracing::debug!(
                "Retrieved {} chunks (nearest distance: {:.4}, farthest: {:.4})",
                hits.len(),
                first.distance,
                last.distance
            );
        }

        Ok(hits)
    }

    /// Drop every stored chunk and vector.
    pub async fn clear(&self) {
        let mut corpus = self.corpus.lock().await;
        corpus.clear();
        tracing::info!("Knowledge base cleared");
    }

    pub async fn stats(&self) -> CorpusStats {
        let corpus = self.corpus.lock().await;
        CorpusStats {
            rows: corpus.index.len(),
            dimension: corpus.index.dimension(),
        }
    }
}
