//! Document memory for docqa.
//!
//! Splits documents into overlapping chunks, embeds them, keeps the vectors
//! in an exact in-memory index and retrieves the chunks nearest to a
//! question. Nothing is persisted; a [`KnowledgeBase`] lives as long as
//! the session that created it.
//!
//! # Example
//! ```no_run
//! use docqa_knowledge::{KnowledgeBase, KnowledgeConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let kb = KnowledgeBase::from_config(&KnowledgeConfig::default(), None)?;
//! kb.store("The sky is blue. Grass is green.").await?;
//! let context = kb.retrieve("What color is the sky?", 3).await?;
//! println!("{:?}", context);
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod knowledge_base;
pub mod rag;
pub mod sources;
pub mod store;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunk::{chunk_text, Chunk, ChunkSize, ChunkingConfig};
pub use config::{load_config, KnowledgeConfig, RetrievalConfig};
pub use embeddings::{Embedder, EmbeddingConfig, EmbeddingIntent, EmbeddingProvider};
pub use error::{KnowledgeError, KnowledgeResult};
pub use knowledge_base::{CorpusStats, KnowledgeBase, RetrievedChunk, SkippedChunk, StoreReport};
pub use sources::{SourceError, TextSource, TranscriptFetcher};
pub use vector_index::{DistanceMetric, FlatIndex, Neighbor, VectorIndex};
