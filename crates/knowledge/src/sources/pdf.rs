//! PDF text extraction using lopdf.

use super::SourceError;
use lopdf::Document;

/// Extract the text of every page, in page order, joined by a space.
///
/// Pages whose text cannot be decoded are skipped with a warning.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, SourceError> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| SourceError::InvalidPdf(e.to_string()))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(SourceError::NoReadablePages);
    }

    // get_pages is keyed by page number, so iteration is in page order
    let page_texts: Vec<String> = pages
        .keys()
        .filter_map(|&page_num| match doc.extract_text(&[page_num]) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(page = page_num, error = %e, "Skipping unreadable PDF page");
                None
            }
        })
        .collect();

    let text = join_pages(&page_texts);
    if text.trim().is_empty() {
        return Err(SourceError::NoExtractableText);
    }

    tracing::debug!(
        pages = pages.len(),
        chars = text.chars().count(),
        "Extracted PDF text"
    );

    Ok(text)
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
