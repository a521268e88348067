//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Renders retrieved chunks into a prompt and has an LLM answer from it.

pub mod ask;
pub mod prompt;
pub mod types;

pub use ask::{answer, ask};
pub use prompt::build_prompt;
pub use types::{Answer, AnswerOptions};
