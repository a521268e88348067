//! Chunk command handler.
//!
//! Shows how a document would be split before it is embedded.

use super::{knowledge_config, print_json};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::sources::load_file;
use docqa_knowledge::{chunk_text, Chunk};
use std::path::PathBuf;

/// Preview the chunks a document would be split into
#[derive(Args, Debug)]
pub struct ChunkCommand {
    /// Text, markdown, HTML or PDF file
    pub file: PathBuf,

    /// Characters of each chunk to show
    #[arg(long, default_value = "80")]
    pub preview: usize,

    /// Output as JSON (full chunk text and spans)
    #[arg(long)]
    pub json: bool,
}

impl ChunkCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chunk command for {:?}", self.file);

        let knowledge = knowledge_config(config)?;
        let text = load_file(&self.file)?;
        let size = knowledge.chunking.size_for(text.chars().count());
        let chunks = chunk_text(&text, &knowledge.chunking)?;

        if self.json {
            return print_json(&serde_json::json!({
                "file": self.file,
                "chars": text.chars().count(),
                "window": size.window,
                "overlap": size.overlap,
                "chunks": chunks,
            }));
        }

        println!(
            "{} chars -> {} chunks (window {}, overlap {})",
            text.chars().count(),
            chunks.len(),
            size.window,
            size.overlap
        );
        for line in summary_lines(&chunks, self.preview) {
            println!("{}", line);
        }

        Ok(())
    }
}

/// One line per chunk: ordinal, byte span, length and a preview.
fn summary_lines(chunks: &[Chunk], preview: usize) -> Vec<String> {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "#{:<4} {:>7}..{:<7} {:>4} chars  {}",
                chunk.ordinal,
                chunk.span.start,
                chunk.span.end,
                chunk.char_count(),
                chunk.preview(preview)
            )
        })
        .collect()
}
