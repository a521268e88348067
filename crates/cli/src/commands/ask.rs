//! Ask command handler.
//!
//! Loads the given documents into a fresh knowledge base, retrieves the
//! chunks nearest to the question and answers from them.

use super::{answer_client, ingest, open_knowledge_base, print_json};
use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::rag::{self, AnswerOptions};
use docqa_knowledge::{TextSource, TranscriptFetcher};
use std::path::PathBuf;

/// Ask a question about one or more documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// PDF file to load (repeatable)
    #[arg(long)]
    pub pdf: Vec<PathBuf>,

    /// Text to load as-is (repeatable)
    #[arg(long)]
    pub text: Vec<String>,

    /// Text, markdown or HTML file to load (repeatable)
    #[arg(long)]
    pub text_file: Vec<PathBuf>,

    /// YouTube URL or video ID whose transcript to load (repeatable)
    #[arg(long)]
    pub video: Vec<String>,

    /// Number of chunks to retrieve (default: knowledge.retrieval.top_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Print the retrieved chunks instead of generating an answer
    #[arg(long)]
    pub context_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let sources = self.sources();
        if sources.is_empty() {
            return Err(AppError::Config(
                "Nothing to search: pass --pdf, --text, --text-file or --video".to_string(),
            ));
        }

        // Fail on a bad answer provider before spending time on embeddings.
        let client = if self.context_only {
            None
        } else {
            Some(answer_client(config)?)
        };

        let knowledge = open_knowledge_base(config)?;
        let transcripts = TranscriptFetcher::default();
        for source in &sources {
            let report = ingest(&knowledge, source, &transcripts).await?;
            tracing::info!(
                "Stored {} of {} chunks from {}",
                report.stored,
                report.chunks_total,
                source.describe()
            );
        }

        let top_k = self.top_k.unwrap_or_else(|| knowledge.default_top_k());

        let Some(client) = client else {
            let hits = knowledge.retrieve_scored(question, top_k).await?;
            if self.json {
                return print_json(&serde_json::json!({
                    "question": question,
                    "chunks": hits,
                }));
            }
            for (i, hit) in hits.iter().enumerate() {
                println!("[{}] distance {:.4}", i + 1, hit.distance);
                println!("{}\n", hit.text.trim());
            }
            return Ok(());
        };

        let options = AnswerOptions::new(config.model.clone());
        let answer = rag::ask(&knowledge, client.as_ref(), &options, question, top_k).await?;

        if self.json {
            print_json(&serde_json::json!({
                "question": question,
                "answer": answer.text,
                "provider": config.provider,
                "model": answer.model,
                "context": answer.context,
            }))
        } else {
            println!("{}", answer.text);
            tracing::debug!("Answer grounded on {} chunks", answer.context.len());
            Ok(())
        }
    }

    /// Sources named on the command line, in a fixed order.
    fn sources(&self) -> Vec<TextSource> {
        let pdfs = self.pdf.iter().cloned().map(TextSource::Pdf);
        let files = self.text_file.iter().cloned().map(TextSource::File);
        let texts = self.text.iter().cloned().map(TextSource::Pasted);
        let videos = self.video.iter().cloned().map(TextSource::Video);

        pdfs.chain(files).chain(texts).chain(videos).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(question: &str) -> AskCommand {
        AskCommand {
            question: question.to_string(),
            pdf: vec![],
            text: vec![],
            text_file: vec![],
            video: vec![],
            top_k: None,
            context_only: true,
            json: false,
        }
    }

    #[test]
    fn test_sources_keep_a_fixed_order() {
        let mut cmd = command("q");
        cmd.video = vec!["dQw4w9WgXcQ".to_string()];
        cmd.text = vec!["pasted".to_string()];
        cmd.pdf = vec![PathBuf::from("a.pdf")];

        assert_eq!(
            cmd.sources(),
            vec![
                TextSource::Pdf(PathBuf::from("a.pdf")),
                TextSource::Pasted("pasted".to_string()),
                TextSource::Video("dQw4w9WgXcQ".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_ask_without_sources_is_rejected() {
        let config = AppConfig::default();
        let err = command("What color is the sky?")
            .execute(&config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Nothing to search"));
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let mut cmd = command("   ");
        cmd.text = vec!["The sky is blue.".to_string()];
        let err = cmd.execute(&AppConfig::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_context_only_with_pasted_text() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            config_file: Some(dir.path().join("missing.yaml")),
            ..AppConfig::default()
        };

        let mut cmd = command("What color is the sky?");
        cmd.text = vec!["The sky is blue.".to_string()];
        cmd.top_k = Some(1);

        cmd.execute(&config).await.unwrap();
    }
}
