//! Interactive session handler.
//!
//! Reads one line at a time from stdin. Lines starting with `/` load
//! documents or manage the knowledge base; anything else is a question.
//! A failing line is reported and the session carries on with whatever
//! was stored before it.

use super::{answer_client, ingest, open_knowledge_base};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::rag::{self, AnswerOptions};
use docqa_knowledge::{KnowledgeBase, TextSource, TranscriptFetcher};
use docqa_llm::LlmClient;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
/pdf <path>        load a PDF
/file <path>       load a text, markdown or HTML file
/text <text>       load the rest of the line as a document
/video <url|id>    load a YouTube transcript
/clear             forget every stored document
/stats             show the size of the knowledge base
/help              show this help
/quit              leave the session
anything else      ask a question";

/// Start an interactive question-answering session
#[derive(Args, Debug)]
pub struct SessionCommand {
    /// Number of chunks to retrieve per question
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Print the retrieved chunks instead of generating answers
    #[arg(long)]
    pub context_only: bool,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Load(TextSource),
    Clear,
    Stats,
    Help,
    Quit,
    Question(String),
    Empty,
}

impl SessionInput {
    /// Parse a line typed at the prompt.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        if !line.starts_with('/') {
            return Ok(Self::Question(line.to_string()));
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let require = |what: &str| {
            if rest.is_empty() {
                Err(format!("{} needs {}", command, what))
            } else {
                Ok(rest.to_string())
            }
        };

        match command {
            "/pdf" => Ok(Self::Load(TextSource::Pdf(PathBuf::from(require("a path")?)))),
            "/file" => Ok(Self::Load(TextSource::File(PathBuf::from(require("a path")?)))),
            "/text" => Ok(Self::Load(TextSource::Pasted(require("some text")?))),
            "/video" => Ok(Self::Load(TextSource::Video(require("a URL or video ID")?))),
            "/clear" => Ok(Self::Clear),
            "/stats" => Ok(Self::Stats),
            "/help" => Ok(Self::Help),
            "/quit" | "/exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command {} (try /help)", other)),
        }
    }
}

impl SessionCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive session");

        let client = if self.context_only {
            None
        } else {
            Some(answer_client(config)?)
        };
        let knowledge = open_knowledge_base(config)?;
        let transcripts = TranscriptFetcher::default();
        let options = AnswerOptions::new(config.model.clone());
        let top_k = self.top_k.unwrap_or_else(|| knowledge.default_top_k());

        println!("docqa session. Load a document, then ask questions. /help lists commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let input = match SessionInput::parse(&line) {
                Ok(input) => input,
                Err(message) => {
                    eprintln!("{}", message);
                    continue;
                }
            };

            let turn = Turn {
                knowledge: &knowledge,
                transcripts: &transcripts,
                client: client.as_ref(),
                options: &options,
                top_k,
            };
            match turn.run(input).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    tracing::debug!("Session command failed: {}", e);
                    eprintln!("error: {}", e);
                }
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }
}

/// Everything one input line may touch.
struct Turn<'a> {
    knowledge: &'a KnowledgeBase,
    transcripts: &'a TranscriptFetcher,
    client: Option<&'a Arc<dyn LlmClient>>,
    options: &'a AnswerOptions,
    top_k: usize,
}

impl Turn<'_> {
    /// Handle one input. Returns `false` when the session should end.
    async fn run(&self, input: SessionInput) -> AppResult<bool> {
        match input {
            SessionInput::Empty => {}
            SessionInput::Help => println!("{}", HELP),
            SessionInput::Quit => return Ok(false),
            SessionInput::Clear => {
                self.knowledge.clear().await;
                println!("Knowledge base cleared.");
            }
            SessionInput::Stats => {
                let stats = self.knowledge.stats().await;
                match stats.dimension {
                    Some(dimension) => {
                        println!("{} chunks stored ({} dimensions)", stats.rows, dimension)
                    }
                    None => println!("Knowledge base is empty."),
                }
            }
            SessionInput::Load(source) => {
                let report = ingest(self.knowledge, &source, self.transcripts).await?;
                println!(
                    "Stored {} of {} chunks from {}.",
                    report.stored,
                    report.chunks_total,
                    source.describe()
                );
            }
            SessionInput::Question(question) => self.answer(&question).await?,
        }
        Ok(true)
    }

    async fn answer(&self, question: &str) -> AppResult<()> {
        let Some(client) = self.client else {
            let context = self.knowledge.retrieve(question, self.top_k).await?;
            for (i, text) in context.iter().enumerate() {
                println!("[{}] {}\n", i + 1, text.trim());
            }
            return Ok(());
        };

        let answer = rag::ask(
            self.knowledge,
            client.as_ref(),
            self.options,
            question,
            self.top_k,
        )
        .await?;

        println!("{}", answer.text);
        Ok(())
    }
}
