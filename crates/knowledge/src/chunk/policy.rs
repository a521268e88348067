//! Chunk size policy.

use crate::error::{KnowledgeError, KnowledgeResult};
use serde::{Deserialize, Serialize};

/// Window and overlap, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSize {
    /// Maximum characters per chunk
    pub window: usize,

    /// Maximum characters shared by consecutive chunks
    pub overlap: usize,
}

impl ChunkSize {
    pub const fn new(window: usize, overlap: usize) -> Self {
        Self { window, overlap }
    }

    fn validate(&self, tier: &str) -> KnowledgeResult<()> {
        if self.window == 0 {
            return Err(KnowledgeError::InvalidConfig(format!(
                "{} chunk window must be greater than zero",
                tier
            )));
        }
        if self.overlap >= self.window {
            return Err(KnowledgeError::InvalidConfig(format!(
                "{} chunk overlap ({}) must be smaller than the window ({})",
                tier, self.overlap, self.window
            )));
        }
        Ok(())
    }
}

/// Two-tier chunking configuration.
///
/// Inputs up to `large_input_threshold` characters use the `small` tier,
/// longer ones the `large` tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Inputs longer than this many characters use the large tier
    pub large_input_threshold: usize,

    /// Sizes for short inputs
    pub small: ChunkSize,

    /// Sizes for long inputs
    pub large: ChunkSize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            large_input_threshold: 20_000,
            small: ChunkSize::new(200, 75),
            large: ChunkSize::new(400, 200),
        }
    }
}

impl ChunkingConfig {
    /// A configuration that uses the same sizes for every input length.
    pub fn fixed(size: ChunkSize) -> Self {
        Self {
            large_input_threshold: usize::MAX,
            small: size,
            large: size,
        }
    }

    /// Sizes to use for an input of `input_chars` characters.
    pub fn size_for(&self, input_chars: usize) -> ChunkSize {
        if input_chars > self.large_input_threshold {
            self.large
        } else {
            self.small
        }
    }

    /// Reject sizes the splitter cannot honor.
    pub fn validate(&self) -> KnowledgeResult<()> {
        self.small.validate("small")?;
        self.large.validate("large")
    }
}
