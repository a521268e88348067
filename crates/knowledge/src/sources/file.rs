//! Plain-text document files and text extraction.

use super::{pdf, SourceError};
use std::fs;
use std::path::Path;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    Pdf,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("pdf") => Self::Pdf,
            Some("txt") | Some("text") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// Read a document file and extract clean text.
///
/// PDFs go through [`pdf::extract_text`]; markdown and HTML are stripped of
/// markup. Files with unknown extensions are read as text unless they look
/// binary.
pub fn load_file(path: &Path) -> Result<String, SourceError> {
    let content_type = ContentType::from_path(path);
    let read_error = |e: std::io::Error| SourceError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if content_type == ContentType::Pdf {
        let bytes = fs::read(path).map_err(read_error)?;
        return pdf::extract_text(&bytes);
    }

    let raw = fs::read_to_string(path).map_err(read_error)?;

    let cleaned = match content_type {
        ContentType::Markdown => clean_markdown(&raw),
        ContentType::Html => clean_html(&raw),
        ContentType::PlainText => raw,
        ContentType::Unknown if is_likely_text(&raw) => raw,
        _ => {
            tracing::warn!("Skipping likely binary file: {:?}", path);
            return Err(SourceError::Binary(path.to_path_buf()));
        }
    };

    if cleaned.trim().is_empty() {
        return Err(SourceError::EmptyText);
    }

    tracing::debug!(
        "Loaded {:?} as {} ({} chars)",
        path,
        content_type.as_str(),
        cleaned.chars().count()
    );

    Ok(cleaned)
}

/// Clean markdown by removing excess formatting.
///
/// Blank lines are kept so paragraph boundaries survive for the chunker.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_blank = true;

    for line in text.lines() {
        // Remove markdown headers
        let trimmed = line.trim_start_matches('#').trim();

        // Skip horizontal rules and code fences
        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if trimmed.is_empty() {
            if !last_blank {
                result.push('\n');
                last_blank = true;
            }
            continue;
        }

        result.push_str(trimmed);
        result.push('\n');
        last_blank = false;
    }

    result.trim().to_string()
}

/// Clean HTML by stripping tags (simple approach).
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut in_script = false;
    let mut in_style = false;

    for (i, ch) in text.char_indices() {
        if ch == '<' {
            in_tag = true;

            // Check for script/style tags
            let rest = &text[i..];
            if starts_with_ignore_case(rest, "<script") {
                in_script = true;
            } else if starts_with_ignore_case(rest, "</script") {
                in_script = false;
            } else if starts_with_ignore_case(rest, "<style") {
                in_style = true;
            } else if starts_with_ignore_case(rest, "</style") {
                in_style = false;
            }
        } else if ch == '>' {
            in_tag = false;
            result.push(' ');
        } else if !in_tag && !in_script && !in_style {
            result.push(ch);
        }
    }

    // Collapse whitespace
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Check if text is likely UTF-8 text (not binary).
fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(
            ContentType::from_path(Path::new("file.md")),
            ContentType::Markdown
        );
        assert_eq!(ContentType::from_path(Path::new("Report.PDF")), ContentType::Pdf);
        assert_eq!(
            ContentType::from_path(Path::new("file.txt")),
            ContentType::PlainText
        );
        assert_eq!(ContentType::from_path(Path::new("file")), ContentType::Unknown);
    }

    #[test]
    fn test_clean_markdown() {
        let input = "# Header\n\nSome text\n\n```rust\ncode\n```\n\nMore text";
        let output = clean_markdown(input);
        assert!(output.contains("Header"));
        assert!(output.contains("Some text"));
        assert!(output.contains("More text"));
        assert!(!output.contains("```"));
    }

    #[test]
    fn test_clean_markdown_keeps_paragraph_breaks() {
        let output = clean_markdown("## One\n\n\n\nTwo\nThree");
        assert_eq!(output, "One\n\nTwo\nThree");
    }

    #[test]
    fn test_clean_html() {
        let input = "<html><body><p>Hello <b>world</b></p></body></html>";
        let output = clean_html(input);
        assert_eq!(output, "Hello world");
    }

    #[test]
    fn test_clean_html_drops_scripts_and_styles() {
        let input = "<p>Keep</p><SCRIPT>var x = 1;</SCRIPT><style>p{}</style><p>this</p>";
        assert_eq!(clean_html(input), "Keep this");
    }

    #[test]
    fn test_clean_html_with_multibyte_text() {
        assert_eq!(clean_html("<p>ação</p><p>🎮</p>"), "ação 🎮");
    }

    #[test]
    fn test_load_markdown_file() {
        let file = temp_file(".md", b"# Title\n\nBody text.\n");
        assert_eq!(load_file(file.path()).unwrap(), "Title\n\nBody text.");
    }

    #[test]
    fn test_load_binary_file_is_rejected() {
        let file = temp_file(".bin", b"abc\0def");
        assert!(matches!(load_file(file.path()), Err(SourceError::Binary(_))));
    }

    #[test]
    fn test_load_blank_file_is_empty_text() {
        let file = temp_file(".txt", b"  \n ");
        assert_eq!(load_file(file.path()), Err(SourceError::EmptyText));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_file(Path::new("/no/such/file.txt")).unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }
}
