//! Output parser for remote merge responses
//!
//! Accepts a bare JSON array, the same array inside a markdown code fence,
//! or an object wrapping the array under `results`. Anything else is a parse
//! error so the caller can retry.

use crate::llm_client::LlmClientError;
use serde_json::Value;

/// Parse model output into exactly `expected` merged objects.
pub fn parse_merge_response(text: &str, expected: usize) -> Result<Vec<Value>, LlmClientError> {
    let body = strip_code_fence(text);
    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        LlmClientError::Parse(format!(
            "response is not JSON ({}): {}",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })?;

    let items = match parsed {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(LlmClientError::Parse(
                    "expected a JSON array of merged records".to_string(),
                ))
            }
        },
        _ => {
            return Err(LlmClientError::Parse(
                "expected a JSON array of merged records".to_string(),
            ))
        }
    };

    if items.len() != expected {
        return Err(LlmClientError::Parse(format!(
            "expected {} merged records, got {}",
            expected,
            items.len()
        )));
    }
    if let Some(pos) = items.iter().position(|item| !item.is_object()) {
        return Err(LlmClientError::Parse(format!(
            "merged record {} is not a JSON object",
            pos
        )));
    }
    Ok(items)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}
