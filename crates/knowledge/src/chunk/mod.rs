//! Size-adaptive, overlapping text chunking.
//!
//! This module provides deterministic segmentation that:
//! - Picks window and overlap sizes from the input length
//! - Cuts at the most natural boundary available (paragraph, line,
//!   sentence, word, grapheme)
//! - Repeats a bounded tail of each chunk at the head of the next one
//!
//! All lengths are counted in Unicode scalar values, never bytes.

mod boundaries;
mod policy;
mod splitter;

pub use boundaries::BoundaryLevel;
pub use policy::{ChunkSize, ChunkingConfig};
pub use splitter::chunk_text;

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A contiguous slice of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position among the emitted chunks (0-indexed)
    pub ordinal: u32,

    /// Chunk text content
    pub content: String,

    /// Byte range in the source text
    pub span: Range<usize>,
}

impl Chunk {
    /// Number of characters in the chunk.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Short single-line preview, for logs and CLI output.
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.content, max_chars)
    }
}

/// Collapse whitespace and cut `text` to at most `max_chars` characters.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_collapses_whitespace() {
        assert_eq!(preview("a\n\nb   c", 20), "a b c");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "héllo wörld ".repeat(10);
        let p = preview(&text, 8);
        assert_eq!(p, "héllo wö...");
    }

    #[test]
    fn test_chunk_char_count() {
        let chunk = Chunk {
            ordinal: 0,
            content: "ação".to_string(),
            span: 0..6,
        };
        assert_eq!(chunk.char_count(), 4);
    }
}
