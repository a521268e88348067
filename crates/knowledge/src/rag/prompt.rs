//! Answer prompt rendering.

/// Render the grounded-answer prompt.
///
/// Context chunks are joined by blank lines, nearest first.
pub fn build_prompt(question: &str, context: &[String]) -> String {
    format!(
        "Use the following context to answer the question below.\n\n\
         Context:\n{}\n\n\
         Question:\n{}\n\n\
         Answer:",
        context.join("\n\n"),
        question
    )
}
