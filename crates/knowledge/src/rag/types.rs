//! Answer types.

use serde::{Deserialize, Serialize};

/// A generated answer and the context it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Text produced by the answer model
    pub text: String,

    /// Chunk texts given to the model, nearest first
    pub context: Vec<String>,

    /// Model that produced the answer
    pub model: String,
}

/// Settings for one answer call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AnswerOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.3,
            max_tokens: 1000,
        }
    }
}
