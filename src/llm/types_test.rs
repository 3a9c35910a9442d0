use super::*;
use crate::error::ErrorCode;

#[test]
fn transport_and_server_side_statuses_are_retryable() {
    assert!(LlmError::Transport("reset".into()).retryable());
    for status in [408, 429, 500, 502, 503] {
        assert!(LlmError::Status { status, body: String::new() }.retryable(), "status {status}");
    }
}

#[test]
fn client_side_failures_are_not_retryable() {
    for err in [
        LlmError::Status { status: 400, body: String::new() },
        LlmError::Status { status: 401, body: String::new() },
        LlmError::Malformed("eof".into()),
        LlmError::Config("provider".into()),
        LlmError::MissingApiKey { var: "OPENAI_API_KEY".into() },
        LlmError::HttpClientBuild("tls".into()),
    ] {
        assert!(!err.retryable(), "{err}");
    }
}

#[test]
fn status_error_keeps_body_out_of_display() {
    let err = LlmError::Status { status: 401, body: "{\"error\":\"bad key sk-123\"}".into() };
    assert_eq!(err.to_string(), "llm provider returned status 401");
    assert_eq!(err.error_code(), "E_LLM_STATUS");
}

#[test]
fn missing_key_names_the_variable() {
    let err = LlmError::MissingApiKey { var: "ANTHROPIC_API_KEY".into() };
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
}
