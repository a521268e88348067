//! Text sources: where documents come from before they are chunked.
//!
//! Each source yields the whole document text or an error; nothing
//! partial is handed to the knowledge base.

pub mod file;
pub mod paste;
pub mod pdf;
pub mod transcript;

pub use file::{load_file, ContentType};
pub use transcript::{extract_video_id, TranscriptFetcher};

use docqa_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while obtaining document text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Invalid or corrupted PDF file: {0}")]
    InvalidPdf(String),

    #[error("The PDF file has no readable pages")]
    NoReadablePages,

    #[error("No extractable text found in the PDF")]
    NoExtractableText,

    #[error("The provided text is empty")]
    EmptyText,

    #[error("Invalid YouTube URL or video ID: {0}")]
    InvalidVideoId(String),

    #[error("The video is unavailable or private")]
    VideoUnavailable,

    #[error("No transcript is available for this video")]
    TranscriptUnavailable,

    #[error("Could not retrieve the transcript: {0}")]
    TranscriptFetch(String),

    #[error("Failed to read {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Unsupported file {0:?}: binary content")]
    Binary(PathBuf),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Source(err.to_string())
    }
}

/// A document to ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// A PDF on disk
    Pdf(PathBuf),
    /// Text given directly
    Pasted(String),
    /// A text, markdown or HTML file
    File(PathBuf),
    /// A YouTube URL or 11-character video ID
    Video(String),
}

impl TextSource {
    /// Short label for logs and CLI output.
    pub fn describe(&self) -> String {
        match self {
            Self::Pdf(path) => format!("pdf {}", path.display()),
            Self::Pasted(text) => format!("pasted text ({} chars)", text.chars().count()),
            Self::File(path) => format!("file {}", path.display()),
            Self::Video(id) => format!("video {}", id),
        }
    }

    /// Produce the document text.
    pub async fn load(&self, transcripts: &TranscriptFetcher) -> Result<String, SourceError> {
        match self {
            Self::Pdf(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| SourceError::Read {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                pdf::extract_text(&bytes)
            }
            Self::Pasted(text) => paste::accept(text),
            Self::File(path) => load_file(path),
            Self::Video(url_or_id) => {
                let video_id = extract_video_id(url_or_id)?;
                transcripts.fetch(&video_id).await
            }
        }
    }
}
