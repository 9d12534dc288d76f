//! Reply cleanup: models wrap JSON in Markdown fences or chatter.

use serde::de::DeserializeOwned;

use crate::error::{ContentError, Result};

/// Drop a surrounding ```` ```lang ... ``` ```` fence, if any.
fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Skip the language tag on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Outermost `{...}` of a reply.
pub(crate) fn extract_json(reply: &str) -> Result<&str> {
    let body = strip_fences(reply);
    let start = body
        .find('{')
        .ok_or_else(|| ContentError::Malformed("no JSON object in reply".into()))?;
    let end = body
        .rfind('}')
        .ok_or_else(|| ContentError::Malformed("no closing brace in reply".into()))?;
    if end < start {
        return Err(ContentError::Malformed("braces out of order".into()));
    }
    Ok(&body[start..=end])
}

pub(crate) fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let json = extract_json(reply)?;
    serde_json::from_str(json).map_err(|e| ContentError::Malformed(format!("{e} - reply: {reply}")))
}
