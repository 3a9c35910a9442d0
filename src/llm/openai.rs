//! `OpenAI` Chat Completions wire format.
//!
//! Any gateway that speaks `/chat/completions` works when `LLM_BASE_URL`
//! points at it. The prompt maps to an optional system turn and one user
//! turn; only the first choice is read.

use serde::{Deserialize, Serialize};

use super::types::{Completion, LlmError, Prompt, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const COMPLETION_PATH: &str = "/chat/completions";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Turn<'a>>,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

pub(crate) fn request_body<'a>(model: &'a str, prompt: &Prompt<'a>) -> ChatRequest<'a> {
    let system = prompt.system.trim();
    let mut messages = Vec::with_capacity(2);
    if !system.is_empty() {
        messages.push(Turn { role: "system", content: system });
    }
    messages.push(Turn { role: "user", content: prompt.user });
    ChatRequest { model, max_tokens: prompt.max_tokens, messages }
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Decode a 200 response body.
pub(crate) fn parse_completion(body: &str) -> Result<Completion, LlmError> {
    let reply: ChatReply = serde_json::from_str(body).map_err(|e| LlmError::Malformed(format!("openai: {e}")))?;
    let Some(choice) = reply.choices.into_iter().next() else {
        return Err(LlmError::Malformed("openai: no choices".into()));
    };

    Ok(Completion {
        text: choice.message.content.unwrap_or_default(),
        model: reply.model,
        truncated: choice.finish_reason.as_deref() == Some("length"),
        usage: reply
            .usage
            .map(|u| TokenUsage { input: u.prompt_tokens, output: u.completion_tokens })
            .unwrap_or_default(),
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
