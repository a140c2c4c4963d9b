//! Tolerant extraction of a JSON object from LLM response text.
//!
//! Chat models rarely return clean JSON: the object may be wrapped in
//! prose, fenced in a markdown code block, or contain literal newlines
//! inside string values. `repair_and_parse` applies a staged fallback so
//! callers only ever deal with a typed result or a single error.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error produced when no parse stage succeeds.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in response text")]
    NoJsonFound,

    #[error("malformed JSON: {0}")]
    Malformed(String),
}

/// Parse a JSON object out of free-form LLM output.
///
/// Stages, in order:
/// 1. direct parse of the trimmed text
/// 2. parse of the first fenced code block, if any
/// 3. parse of the outermost `{...}` span after repairing control
///    characters embedded in string literals
pub fn repair_and_parse<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Ok(value);
    }

    if let Some(fenced) = extract_fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<T>(fenced.trim()) {
            return Ok(value);
        }
    }

    let span = extract_brace_span(trimmed).ok_or(ParseError::NoJsonFound)?;
    let repaired = escape_control_chars(span);
    serde_json::from_str::<T>(&repaired).map_err(|e| ParseError::Malformed(e.to_string()))
}

/// Extract the body of the first markdown code fence, tolerating an
/// optional language tag (```json).
fn extract_fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip the language tag up to the first newline.
    let body_start = after_fence.find('\n')?;
    let body = &after_fence[body_start + 1..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// Locate the outermost `{...}` span.
fn extract_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Escape literal control characters found inside JSON string literals.
///
/// Models frequently emit real newlines inside lyrics strings, which is
/// invalid JSON. Newlines, tabs and carriage returns become their escape
/// sequences; any other control character is dropped. Characters outside
/// string literals are passed through untouched.
fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                in_string = !in_string;
                out.push(c);
            }
            '\n' if in_string => out.push_str("\\n"),
            '\t' if in_string => out.push_str("\\t"),
            '\r' if in_string => out.push_str("\\r"),
            c if in_string && c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}
