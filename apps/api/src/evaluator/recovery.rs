//! JSON recovery for generated text, which is not guaranteed to be pure JSON.
//!
//! Tier 1 parses the whole reply. Tier 2 narrows to the outermost braces and
//! parses that, then falls back to the first balanced `{...}` region that
//! parses on its own.

use serde_json::Value;
use tracing::debug;

use crate::evaluator::EvaluatorError;

pub fn recover_json(text: &str) -> Result<Value, EvaluatorError> {
    let text = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    debug!("LLM reply is not pure JSON, narrowing to outermost braces");
    let narrowed = narrow_to_braces(text);
    if let Ok(value) = serde_json::from_str::<Value>(narrowed) {
        return Ok(value);
    }

    first_parseable_object(narrowed).ok_or(EvaluatorError::UnparsableResponse)
}

/// Drops everything before the first `{` and after the last `}`.
fn narrow_to_braces(text: &str) -> &str {
    let Some(start) = text.find('{') else {
        return "";
    };
    match text.rfind('}') {
        Some(end) if end >= start => &text[start..=end],
        _ => &text[start..],
    }
}

fn first_parseable_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let region = balanced_region(&text[start..])?;
        serde_json::from_str::<Value>(region).ok()
    })
}

/// Returns the prefix of `text` (which starts at `{`) up to its matching `}`.
/// Braces inside string literals are ignored.
fn balanced_region(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
