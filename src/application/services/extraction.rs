//! Best-effort recovery of structured payloads from model responses
//!
//! Generation models frequently wrap structured output in prose
//! commentary. Extraction tolerates prefix and suffix noise but does
//! not attempt semantic repair of malformed content.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no structured payload found in response")]
    NoStructuredPayload,
    #[error("structured payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Scan raw text for the first balanced top-level object or list and
/// parse it as JSON.
///
/// The match is greedy: the first `{` or `[` is paired with the last
/// matching closer in the full span.
pub fn extract(raw: &str) -> Result<serde_json::Value, ExtractionError> {
    let object = raw.find('{');
    let list = raw.find('[');

    let (start, closer) = match (object, list) {
        (Some(o), Some(l)) if o < l => (o, '}'),
        (Some(o), None) => (o, '}'),
        (_, Some(l)) => (l, ']'),
        (None, None) => return Err(ExtractionError::NoStructuredPayload),
    };

    let end = raw
        .rfind(closer)
        .filter(|&end| end > start)
        .ok_or(ExtractionError::NoStructuredPayload)?;

    Ok(serde_json::from_str(&raw[start..=end])?)
}
