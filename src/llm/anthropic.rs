//! Anthropic Messages API wire format.
//!
//! The prompt maps to a top-level `system` string plus a single user turn.
//! Only `text` blocks of the reply are kept; `thinking` and anything else the
//! model emits is ignored.

use serde::{Deserialize, Serialize};

use super::types::{Completion, LlmError, Prompt, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub(crate) const COMPLETION_PATH: &str = "/messages";
pub(crate) const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

pub(crate) fn request_body<'a>(model: &'a str, prompt: &Prompt<'a>) -> MessagesRequest<'a> {
    MessagesRequest {
        model,
        max_tokens: prompt.max_tokens,
        system: prompt.system.trim(),
        messages: [UserTurn { role: "user", content: prompt.user }],
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<Block>,
    #[serde(default)]
    model: String,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Block {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Decode a 200 response body.
pub(crate) fn parse_completion(body: &str) -> Result<Completion, LlmError> {
    let reply: MessagesResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Malformed(format!("anthropic: {e}")))?;

    let text: String = reply
        .content
        .into_iter()
        .filter_map(|block| match block {
            Block::Text { text } => Some(text),
            Block::Other => None,
        })
        .collect();

    Ok(Completion {
        text,
        model: reply.model,
        truncated: reply.stop_reason.as_deref() == Some("max_tokens"),
        usage: TokenUsage { input: reply.usage.input_tokens, output: reply.usage.output_tokens },
    })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
