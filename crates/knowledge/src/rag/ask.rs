//! Retrieval-augmented answering.
//!
//! Retrieves the chunks nearest to a question and has an LLM answer from
//! them.

use crate::knowledge_base::KnowledgeBase;
use crate::rag::prompt::build_prompt;
use crate::rag::types::{Answer, AnswerOptions};
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest};

/// Answer `question` from already-retrieved `context` chunks.
pub async fn answer(
    client: &dyn LlmClient,
    options: &AnswerOptions,
    question: &str,
    context: Vec<String>,
) -> AppResult<Answer> {
    let prompt = build_prompt(question, &context);

    tracing::debug!(
        provider = client.provider_name(),
        model = %options.model,
        context_chunks = context.len(),
        prompt_chars = prompt.chars().count(),
        "Generating answer"
    );

    let request = LlmRequest::new(prompt, options.model.clone())
        .with_temperature(options.temperature)
        .with_max_tokens(options.max_tokens);

    let response = client
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Answer generation failed: {}", e)))?;

    Ok(Answer {
        text: response.content.trim().to_string(),
        context,
        model: response.model,
    })
}

/// Retrieve the `top_k` nearest chunks and answer from them.
pub async fn ask(
    knowledge: &KnowledgeBase,
    client: &dyn LlmClient,
    options: &AnswerOptions,
    question: &str,
    top_k: usize,
) -> AppResult<Answer> {
    tracing::info!("Answering question: {}", question);

    let context = knowledge.retrieve(question, top_k).await?;
    answer(client, options, question, context).await
}
