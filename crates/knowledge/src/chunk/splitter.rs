//! Recursive boundary splitter.

use super::boundaries::{BoundaryLevel, BoundaryMap};
use super::policy::{ChunkSize, ChunkingConfig};
use super::Chunk;
use crate::error::{KnowledgeError, KnowledgeResult};

/// Split `text` into ordered, overlapping chunks.
///
/// Window and overlap come from [`ChunkingConfig::size_for`] applied to the
/// input length. Each chunk ends at the most natural boundary that keeps it
/// within the window, and the next chunk starts at the most natural
/// boundary inside the overlap region, so neighbours share between one and
/// `overlap` characters. Chunks consisting only of whitespace are dropped.
///
/// # Errors
/// * `KnowledgeError::EmptyInput` - `text` is the empty string
/// * `KnowledgeError::InvalidConfig` - the configured sizes are unusable
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> KnowledgeResult<Vec<Chunk>> {
    if text.is_empty() {
        return Err(KnowledgeError::EmptyInput);
    }
    config.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let map = BoundaryMap::new(text);
    let total = map.char_len();
    let size = config.size_for(total);

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut prev_end = 0;

    loop {
        let end = if total - start <= size.window {
            total
        } else {
            chunk_end(&map, start, prev_end, size.window)
        };

        let span = map.byte_range(start, end);
        let content = &text[span.clone()];
        if !content.trim().is_empty() {
            chunks.push(Chunk {
                ordinal: chunks.len() as u32,
                content: content.to_string(),
                span,
            });
        }

        if end >= total {
            break;
        }

        start = next_start(&map, start, end, size);
        prev_end = end;
    }

    tracing::debug!(
        chars = total,
        window = size.window,
        overlap = size.overlap,
        chunks = chunks.len(),
        "Chunked text"
    );

    Ok(chunks)
}

/// Where a chunk starting at `start` should end.
///
/// The cut is the last boundary of the best level in the upper half of the
/// window. The lower bound never drops to or below `prev_end`, so every
/// chunk reaches further than the previous one.
fn chunk_end(map: &BoundaryMap, start: usize, prev_end: usize, window: usize) -> usize {
    let limit = start + window;
    let floor = prev_end.max(start) + 1;
    let preferred = (start + window / 2).max(floor);

    for lo in [preferred, floor] {
        for level in BoundaryLevel::PRIORITY {
            if let Some(pos) = map.last_in(level, lo, limit) {
                return pos;
            }
        }
    }

    // A single grapheme wider than the window: keep it whole.
    map.first_in(BoundaryLevel::Grapheme, limit + 1, map.char_len() + 1)
        .unwrap_or_else(|| map.char_len())
}

/// Where the chunk after `[start, end)` should begin.
///
/// The start is never so early that the grapheme following `end` would
/// fall outside the next window; otherwise the next chunk could not end
/// past `end` without overrunning the window.
fn next_start(map: &BoundaryMap, start: usize, end: usize, size: ChunkSize) -> usize {
    let next_grapheme_end = map
        .first_in(BoundaryLevel::Grapheme, end + 1, map.char_len() + 1)
        .unwrap_or_else(|| map.char_len());
    let lo = end
        .saturating_sub(size.overlap)
        .max(start + 1)
        .max(next_grapheme_end.saturating_sub(size.window));
    if lo >= end {
        return end;
    }

    BoundaryLevel::PRIORITY
        .into_iter()
        .find_map(|level| map.first_in(level, lo, end))
        .unwrap_or(lo)
}
