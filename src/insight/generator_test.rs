use super::*;
use crate::llm::Completion;
use std::sync::Mutex;

// =========================================================================
// ScriptedModel
// =========================================================================

/// Replays completions in order and records every prompt it was sent.
struct ScriptedModel {
    replies: Mutex<Vec<Result<Completion, LlmError>>>,
    systems: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    max_tokens: Mutex<Vec<u32>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<Completion, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            systems: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            max_tokens: Mutex::new(Vec::new()),
        }
    }

    fn replying(text: &str) -> Self {
        Self::new(vec![Ok(completion(text))])
    }
}

fn completion(text: &str) -> Completion {
    Completion { text: text.into(), model: "scripted".into(), ..Completion::default() }
}

#[async_trait::async_trait]
impl Completer for ScriptedModel {
    async fn complete(&self, prompt: &Prompt<'_>) -> Result<Completion, LlmError> {
        self.systems.lock().unwrap().push(prompt.system.to_string());
        self.prompts.lock().unwrap().push(prompt.user.to_string());
        self.max_tokens.lock().unwrap().push(prompt.max_tokens);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() { Ok(completion("default reading")) } else { replies.remove(0) }
    }
}

fn generator(llm: &Arc<ScriptedModel>, format: ResponseFormat) -> LlmInsightGenerator {
    LlmInsightGenerator::new(Arc::clone(llm) as Arc<dyn Completer>, 256, format)
}

fn career_request() -> InsightRequest {
    InsightRequest::for_topic(Topic::Career, &[Card::new("the_fool"), Card::new("death")])
}

// =========================================================================
// InsightRequest
// =========================================================================

#[test]
fn for_topic_interpolates_topic_and_card_names() {
    let req = career_request();
    assert_eq!(req.topic, Some(Topic::Career));
    assert_eq!(req.cards, vec!["The Fool".to_string(), "Death".to_string()]);
    assert!(req.user_prompt.contains("Career & Work"));
    assert!(req.user_prompt.contains("1. The Fool"));
    assert!(req.user_prompt.contains("2. Death"));
    assert!(req.user_prompt.contains("about career"));
    assert!(req.system_instruction.contains("tarot reader"));
}

#[test]
fn daily_advice_names_the_card() {
    let req = InsightRequest::daily_advice(&Card::new("wheel_of_fortune"));
    assert_eq!(req.topic, None);
    assert_eq!(req.cards, vec!["Wheel of Fortune".to_string()]);
    assert!(req.user_prompt.contains("Wheel of Fortune"));
    assert!(req.system_instruction.contains("card-of-the-day"));
}

// =========================================================================
// LlmInsightGenerator, text mode
// =========================================================================

#[tokio::test]
async fn text_mode_returns_trimmed_reply() {
    let llm = Arc::new(ScriptedModel::replying("  Insight about career \n"));
    let text = generator(&llm, ResponseFormat::Text).generate(&career_request()).await.unwrap();
    assert_eq!(text, "Insight about career");
    assert!(llm.prompts.lock().unwrap()[0].contains("The Fool"));
}

#[tokio::test]
async fn prompt_is_one_system_and_one_user_text() {
    let llm = Arc::new(ScriptedModel::replying("ok"));
    let request = career_request();
    generator(&llm, ResponseFormat::Text).generate(&request).await.unwrap();
    assert_eq!(llm.systems.lock().unwrap()[0], request.system_instruction);
    assert_eq!(llm.prompts.lock().unwrap()[0], request.user_prompt);
    assert_eq!(llm.max_tokens.lock().unwrap()[0], 256);
}

#[tokio::test]
async fn truncated_reply_is_still_returned() {
    let llm = Arc::new(ScriptedModel::new(vec![Ok(Completion { truncated: true, ..completion("Half a reading") })]));
    let text = generator(&llm, ResponseFormat::Text).generate(&career_request()).await.unwrap();
    assert_eq!(text, "Half a reading");
}

#[tokio::test]
async fn text_mode_uses_plain_system_prompt() {
    let llm = Arc::new(ScriptedModel::replying("ok"));
    generator(&llm, ResponseFormat::Text).generate(&career_request()).await.unwrap();
    assert!(!llm.systems.lock().unwrap()[0].contains("JSON"));
}

#[tokio::test]
async fn text_mode_empty_reply_is_invalid() {
    let llm = Arc::new(ScriptedModel::replying(" \n "));
    let err = generator(&llm, ResponseFormat::Text).generate(&career_request()).await.unwrap_err();
    assert!(matches!(err, InsightError::InvalidResponse(_)));
}

#[tokio::test]
async fn transport_error_is_network_failure() {
    let llm = Arc::new(ScriptedModel::new(vec![Err(LlmError::Transport("connection reset".into()))]));
    let err = generator(&llm, ResponseFormat::Text).generate(&career_request()).await.unwrap_err();
    assert!(matches!(err, InsightError::Network(ref msg) if msg.contains("connection reset")));
}

#[tokio::test]
async fn provider_status_error_is_network_failure() {
    let llm = Arc::new(ScriptedModel::new(vec![Err(LlmError::Status { status: 503, body: String::new() })]));
    let err = generator(&llm, ResponseFormat::Text).generate(&career_request()).await.unwrap_err();
    assert!(matches!(err, InsightError::Network(_)));
}

#[tokio::test]
async fn provider_parse_error_is_invalid_response() {
    let llm = Arc::new(ScriptedModel::new(vec![Err(LlmError::Malformed("eof".into()))]));
    let err = generator(&llm, ResponseFormat::Text).generate(&career_request()).await.unwrap_err();
    assert_eq!(err, InsightError::InvalidResponse("eof".into()));
}

// =========================================================================
// LlmInsightGenerator, json mode
// =========================================================================

#[tokio::test]
async fn json_mode_extracts_description() {
    let llm = Arc::new(ScriptedModel::replying(r#"{"description": "Insight about career"}"#));
    let text = generator(&llm, ResponseFormat::Json).generate(&career_request()).await.unwrap();
    assert_eq!(text, "Insight about career");
    assert!(llm.systems.lock().unwrap()[0].contains("\"description\""));
}

#[tokio::test]
async fn json_mode_rejects_prose() {
    let llm = Arc::new(ScriptedModel::replying("Here is your reading: good things."));
    let err = generator(&llm, ResponseFormat::Json).generate(&career_request()).await.unwrap_err();
    assert!(matches!(err, InsightError::InvalidResponse(_)));
}

// =========================================================================
// parse_description
// =========================================================================

#[test]
fn parse_description_plain_object() {
    assert_eq!(parse_description(r#"{"description":"calm"}"#).unwrap(), "calm");
}

#[test]
fn parse_description_fenced_object() {
    let raw = "```json\n{\"description\": \"fenced\"}\n```";
    assert_eq!(parse_description(raw).unwrap(), "fenced");
}

#[test]
fn parse_description_bare_fence() {
    let raw = "```\n{\"description\": \"bare\"}\n```";
    assert_eq!(parse_description(raw).unwrap(), "bare");
}

#[test]
fn parse_description_missing_field() {
    assert!(matches!(parse_description(r#"{"text":"x"}"#), Err(InsightError::InvalidResponse(_))));
}

#[test]
fn parse_description_empty_value() {
    assert_eq!(
        parse_description(r#"{"description":"   "}"#),
        Err(InsightError::InvalidResponse("empty description".into()))
    );
}

#[test]
fn classify_maps_every_transport_variant_to_network() {
    for err in [
        LlmError::Transport("x".into()),
        LlmError::Status { status: 401, body: String::new() },
        LlmError::HttpClientBuild("tls".into()),
        LlmError::MissingApiKey { var: "K".into() },
        LlmError::Config("bad".into()),
    ] {
        assert!(matches!(classify_llm_error(err), InsightError::Network(_)));
    }
}
