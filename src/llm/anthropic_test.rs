use super::*;
use serde_json::json;

fn prompt<'a>(system: &'a str, user: &'a str) -> Prompt<'a> {
    Prompt { system, user, max_tokens: 300 }
}

#[test]
fn request_carries_system_and_one_user_turn() {
    let body = serde_json::to_value(request_body("claude-test", &prompt("Be brief.", "Topic: Love"))).unwrap();
    assert_eq!(
        body,
        json!({
            "model": "claude-test",
            "max_tokens": 300,
            "system": "Be brief.",
            "messages": [{ "role": "user", "content": "Topic: Love" }],
        })
    );
}

#[test]
fn blank_system_is_omitted() {
    let body = serde_json::to_value(request_body("m", &prompt("  \n", "hi"))).unwrap();
    assert!(body.get("system").is_none());
}

#[test]
fn reply_text_skips_non_text_blocks() {
    let raw = json!({
        "model": "claude-test",
        "stop_reason": "end_turn",
        "content": [
            { "type": "thinking", "thinking": "the cards suggest..." },
            { "type": "text", "text": "The Star asks you " },
            { "type": "text", "text": "to trust the slow work." },
        ],
        "usage": { "input_tokens": 41, "output_tokens": 12 },
    });
    let done = parse_completion(&raw.to_string()).unwrap();
    assert_eq!(done.text, "The Star asks you to trust the slow work.");
    assert_eq!(done.model, "claude-test");
    assert!(!done.truncated);
    assert_eq!(done.usage, TokenUsage { input: 41, output: 12 });
}

#[test]
fn max_tokens_stop_is_truncated() {
    let raw = r#"{"content":[{"type":"text","text":"The Tower"}],"stop_reason":"max_tokens"}"#;
    let done = parse_completion(raw).unwrap();
    assert!(done.truncated);
    assert_eq!(done.usage, TokenUsage::default());
}

#[test]
fn reply_without_text_is_empty_not_an_error() {
    let done = parse_completion(r#"{"content":[],"stop_reason":"end_turn"}"#).unwrap();
    assert!(done.text.is_empty());
}

#[test]
fn error_envelope_is_malformed() {
    let raw = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
    assert!(matches!(parse_completion(raw), Err(LlmError::Malformed(msg)) if msg.starts_with("anthropic")));
}
