//! Command handlers for the docqa CLI.
//!
//! Each command builds its own [`KnowledgeBase`]; nothing survives the
//! process.

pub mod ask;
pub mod chunk;
pub mod session;

pub use ask::AskCommand;
pub use chunk::ChunkCommand;
pub use session::SessionCommand;

use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::{KnowledgeBase, KnowledgeConfig, StoreReport, TextSource, TranscriptFetcher};
use docqa_llm::{create_client, LlmClient};
use std::sync::Arc;

/// Read the `knowledge:` section of the active config file.
pub(crate) fn knowledge_config(config: &AppConfig) -> AppResult<KnowledgeConfig> {
    docqa_knowledge::load_config(&config.config_path())
}

/// Create an empty knowledge base with the configured embedding provider.
pub(crate) fn open_knowledge_base(config: &AppConfig) -> AppResult<KnowledgeBase> {
    let knowledge = knowledge_config(config)?;
    let api_key = config.resolve_api_key("gemini");

    tracing::debug!(
        provider = %knowledge.embedding.provider,
        model = %knowledge.embedding.model,
        "Opening knowledge base"
    );

    Ok(KnowledgeBase::from_config(&knowledge, api_key.as_deref())?)
}

/// Answer client for the active provider.
pub(crate) fn answer_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    config.validate()?;

    let endpoint = config.endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);

    create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
        .map_err(AppError::Config)
}

/// Load a source and store its text.
///
/// Skipped chunks do not fail the call; they are reported on stderr.
pub(crate) async fn ingest(
    knowledge: &KnowledgeBase,
    source: &TextSource,
    transcripts: &TranscriptFetcher,
) -> AppResult<StoreReport> {
    tracing::info!("Loading {}", source.describe());

    let text = source.load(transcripts).await?;
    let report = knowledge.store(&text).await?;

    if !report.skipped.is_empty() {
        eprintln!(
            "warning: {} of {} chunks from {} could not be embedded and were left out",
            report.skipped.len(),
            report.chunks_total,
            source.describe()
        );
        for skipped in &report.skipped {
            tracing::warn!(
                ordinal = skipped.ordinal,
                reason = %skipped.reason,
                "Skipped chunk: {}",
                skipped.preview
            );
        }
    }

    Ok(report)
}

/// Pretty-print a JSON value on stdout.
pub(crate) fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
