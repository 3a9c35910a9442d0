//! Insight generation: prompt construction and the collaborator boundary.
//!
//! DESIGN
//! ======
//! `InsightRequest` is the whole outbound contract: a system instruction,
//! a user prompt, and the display names of the cards it was built from.
//! `InsightGenerator` turns a request into reading text; the engine and the
//! daily-card service depend only on the trait. `LlmInsightGenerator` is the
//! production adapter over any `Completer`.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures become `InsightError::Network`; unparseable or empty
//! replies become `InsightError::InvalidResponse`. No retries happen here.

use std::fmt::Write;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::state::InsightError;
use crate::config::ResponseFormat;
use crate::deck::Card;
use crate::llm::{Completer, LlmError, Prompt};
use crate::topic::Topic;

const READER_INSTRUCTION: &str = "You are a thoughtful tarot reader. Give a short, warm and grounded reading \
     in plain prose (three to five sentences). Speak to the querent directly. Never predict death or illness \
     and never give medical, legal or financial guarantees.";

const DAILY_INSTRUCTION: &str = "You are a tarot guide writing a card-of-the-day message. Keep it to one or \
     two sentences of practical, encouraging advice for today.";

const JSON_INSTRUCTION: &str = "Respond only with a JSON object of the form {\"description\": \"<reading>\"} \
     and nothing else.";

// =============================================================================
// REQUEST
// =============================================================================

/// One outbound generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightRequest {
    /// Topic the reading is for; `None` for card-of-the-day advice.
    pub topic: Option<Topic>,
    pub system_instruction: String,
    pub user_prompt: String,
    /// Display names of the context cards, in draw order.
    pub cards: Vec<String>,
}

impl InsightRequest {
    /// Reading for `topic` given the cards of the active spread.
    #[must_use]
    pub fn for_topic(topic: Topic, cards: &[Card]) -> Self {
        let names: Vec<String> = cards.iter().map(Card::display_name).collect();
        let mut user_prompt = format!("Topic: {}\nCards drawn, in order:\n", topic.title());
        for (i, name) in names.iter().enumerate() {
            let _ = writeln!(user_prompt, "{}. {name}", i + 1);
        }
        let _ = write!(
            user_prompt,
            "\nWrite a reading about {} that connects these cards to the querent's situation.",
            topic.as_str()
        );
        Self { topic: Some(topic), system_instruction: READER_INSTRUCTION.to_string(), user_prompt, cards: names }
    }

    /// Card-of-the-day advice for a single drawn card.
    #[must_use]
    pub fn daily_advice(card: &Card) -> Self {
        let name = card.display_name();
        Self {
            topic: None,
            system_instruction: DAILY_INSTRUCTION.to_string(),
            user_prompt: format!("Today's card is {name}. What should I keep in mind today?"),
            cards: vec![name],
        }
    }
}

// =============================================================================
// GENERATOR TRAIT
// =============================================================================

/// Text-generation collaborator. Enables mocking in tests.
#[async_trait::async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Produce reading text for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Network`] or [`InsightError::InvalidResponse`].
    async fn generate(&self, request: &InsightRequest) -> Result<String, InsightError>;
}

// =============================================================================
// LLM ADAPTER
// =============================================================================

/// Generator backed by an LLM provider.
pub struct LlmInsightGenerator {
    llm: Arc<dyn Completer>,
    max_tokens: u32,
    format: ResponseFormat,
}

impl LlmInsightGenerator {
    #[must_use]
    pub fn new(llm: Arc<dyn Completer>, max_tokens: u32, format: ResponseFormat) -> Self {
        Self { llm, max_tokens, format }
    }

    fn system_prompt(&self, request: &InsightRequest) -> String {
        match self.format {
            ResponseFormat::Text => request.system_instruction.clone(),
            ResponseFormat::Json => format!("{}\n\n{JSON_INSTRUCTION}", request.system_instruction),
        }
    }
}

#[async_trait::async_trait]
impl InsightGenerator for LlmInsightGenerator {
    async fn generate(&self, request: &InsightRequest) -> Result<String, InsightError> {
        let system = self.system_prompt(request);
        let prompt = Prompt { system: &system, user: &request.user_prompt, max_tokens: self.max_tokens };

        let completion = self.llm.complete(&prompt).await.map_err(classify_llm_error)?;

        info!(
            topic = ?request.topic,
            model = %completion.model,
            input_tokens = completion.usage.input,
            output_tokens = completion.usage.output,
            "insight: LLM response"
        );
        if completion.truncated {
            warn!(topic = ?request.topic, max_tokens = self.max_tokens, "insight: reply hit the token limit");
        }

        let reading = match self.format {
            ResponseFormat::Text => completion.text.trim().to_string(),
            ResponseFormat::Json => parse_description(&completion.text)?,
        };
        if reading.is_empty() {
            warn!(topic = ?request.topic, "insight: empty reading");
            return Err(InsightError::InvalidResponse("empty reading".into()));
        }
        Ok(reading)
    }
}

pub(crate) fn classify_llm_error(err: LlmError) -> InsightError {
    match err {
        LlmError::Malformed(msg) => InsightError::InvalidResponse(msg),
        other => InsightError::Network(other.to_string()),
    }
}

#[derive(Deserialize)]
struct DescriptionReply {
    description: String,
}

/// Extract `description` from a strict JSON reply, tolerating a code fence.
pub(crate) fn parse_description(raw: &str) -> Result<String, InsightError> {
    let body = strip_code_fence(raw.trim());
    let reply: DescriptionReply =
        serde_json::from_str(body).map_err(|e| InsightError::InvalidResponse(format!("description JSON: {e}")))?;
    let description = reply.description.trim();
    if description.is_empty() {
        return Err(InsightError::InvalidResponse("empty description".into()));
    }
    Ok(description.to_string())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
