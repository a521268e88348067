//! Candidate cut positions, grouped by how natural a cut there is.

use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Kinds of boundary, most natural first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryLevel {
    /// After a blank line (`\n\n`)
    Paragraph,
    /// After a newline
    Line,
    /// After a sentence, per UAX #29
    Sentence,
    /// After a whitespace character
    Word,
    /// After an extended grapheme cluster
    Grapheme,
}

impl BoundaryLevel {
    /// Levels in the order the splitter tries them.
    pub const PRIORITY: [BoundaryLevel; 5] = [
        Self::Paragraph,
        Self::Line,
        Self::Sentence,
        Self::Word,
        Self::Grapheme,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Character-indexed view of a text with its boundary positions.
///
/// A boundary at position `p` means a cut between character `p - 1` and
/// character `p`. Position 0 is never a boundary.
pub(crate) struct BoundaryMap {
    /// Byte offset of every character, plus the text length at the end
    char_offsets: Vec<usize>,
    /// Sorted boundary positions (in characters) per level
    levels: [Vec<usize>; 5],
}

impl BoundaryMap {
    pub(crate) fn new(text: &str) -> Self {
        let char_offsets: Vec<usize> = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(text.len()))
            .collect();

        let to_char = |byte: usize| -> usize {
            char_offsets
                .binary_search(&byte)
                .unwrap_or_else(|insert_at| insert_at)
        };

        let paragraph = text
            .match_indices("\n\n")
            .map(|(b, m)| to_char(b + m.len()))
            .collect();
        let line = text
            .match_indices('\n')
            .map(|(b, m)| to_char(b + m.len()))
            .collect();
        let sentence = text
            .split_sentence_bound_indices()
            .map(|(b, s)| to_char(b + s.len()))
            .collect();
        let word = text
            .char_indices()
            .filter(|(_, c)| c.is_whitespace())
            .map(|(b, c)| to_char(b + c.len_utf8()))
            .collect();
        let grapheme = text
            .grapheme_indices(true)
            .map(|(b, g)| to_char(b + g.len()))
            .collect();

        Self {
            levels: [paragraph, line, sentence, word, grapheme],
            char_offsets,
        }
    }

    /// Length of the text in characters.
    pub(crate) fn char_len(&self) -> usize {
        self.char_offsets.len() - 1
    }

    /// Byte range covering characters `[start, end)`.
    pub(crate) fn byte_range(&self, start: usize, end: usize) -> Range<usize> {
        self.char_offsets[start]..self.char_offsets[end]
    }

    /// Last boundary of `level` within `[lo, hi]`.
    pub(crate) fn last_in(&self, level: BoundaryLevel, lo: usize, hi: usize) -> Option<usize> {
        let positions = &self.levels[level.slot()];
        let idx = positions.partition_point(|&p| p <= hi);
        idx.checked_sub(1)
            .map(|i| positions[i])
            .filter(|&p| p >= lo)
    }

    /// First boundary of `level` within `[lo, hi)`.
    pub(crate) fn first_in(&self, level: BoundaryLevel, lo: usize, hi: usize) -> Option<usize> {
        let positions = &self.levels[level.slot()];
        let idx = positions.partition_point(|&p| p < lo);
        positions.get(idx).copied().filter(|&p| p < hi)
    }
}
