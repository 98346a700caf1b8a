//! Locating the JSON payload inside free-form model output.
//!
//! Models wrap their answer in prose, markdown fences and trailing commentary.
//! The scan below walks the text once with a brace-depth counter and stops at
//! the first structurally complete object, so stray braces after the payload
//! never leak into the candidate.

use tracing::{debug, warn};

use crate::error::ExtractionError;

/// Start of a quiz batch object. Preferred over the first `{` when present.
pub const SEGMENTS_ANCHOR: &str = r#"{"segments":"#;

/// Result of scanning text for a balanced object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan<'a> {
    /// A balanced `{...}` object, trimmed.
    Found(&'a str),
    /// No opening brace anywhere in the text.
    NotFound,
    /// An opening brace whose depth never returned to zero. Holds the
    /// trimmed remainder from that brace to the end of the text.
    Unterminated(&'a str),
}

fn start_position(text: &str, anchor: &str) -> Option<usize> {
    let anchored = if anchor.is_empty() {
        None
    } else {
        text.find(anchor)
            .and_then(|at| text[at..].find('{').map(|offset| at + offset))
    };

    anchored.or_else(|| text.find('{'))
}

pub fn scan_object<'a>(text: &'a str, anchor: &str) -> Scan<'a> {
    let Some(start) = start_position(text, anchor) else {
        return Scan::NotFound;
    };

    let rest = &text[start..];
    let mut depth: usize = 0;

    for (i, ch) in rest.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Scan::Found(rest[..=i].trim());
                }
            }
            _ => {}
        }
    }

    Scan::Unterminated(rest.trim())
}

/// Isolate the candidate JSON object in `text`.
///
/// An unterminated object is still returned as the candidate; parsing it
/// fails downstream and surfaces as [`ExtractionError::MalformedJson`].
pub fn extract_object<'a>(text: &'a str, anchor: &str) -> Result<&'a str, ExtractionError> {
    match scan_object(text, anchor) {
        Scan::Found(candidate) => {
            debug!(len = candidate.len(), "extracted JSON candidate");
            Ok(candidate)
        }
        Scan::Unterminated(candidate) => {
            warn!(
                len = candidate.len(),
                "JSON object never closed, passing remainder to parser"
            );
            Ok(candidate)
        }
        Scan::NotFound => Err(ExtractionError::NoJsonFound),
    }
}
