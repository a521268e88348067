//! Row-aligned chunk text storage.

/// Chunk texts in index row order: `get(i)` is the text behind row `i`.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    texts: Vec<String>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append texts in order.
    pub fn append(&mut self, texts: impl IntoIterator<Item = String>) {
        self.texts.extend(texts);
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.texts.get(row).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }
}
