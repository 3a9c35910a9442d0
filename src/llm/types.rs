//! Completion contract between the insight layer and a hosted model.
//!
//! A reading is one system instruction plus one user prompt in, plain text
//! out. Nothing here knows about conversations, tools or streaming.

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// An `LLM_*` setting holds an unusable value.
    #[error("llm config: {0}")]
    Config(String),

    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("llm transport: {0}")]
    Transport(String),

    #[error("llm provider returned status {status}")]
    Status { status: u16, body: String },

    /// A 200 response whose body is not the provider's completion shape.
    #[error("llm reply malformed: {0}")]
    Malformed(String),

    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "E_LLM_CONFIG",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::Transport(_) => "E_LLM_TRANSPORT",
            Self::Status { .. } => "E_LLM_STATUS",
            Self::Malformed(_) => "E_LLM_MALFORMED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 408 | 429 | 500..=599, .. })
    }
}

// =============================================================================
// PROMPT / COMPLETION
// =============================================================================

/// One single-turn completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

/// Text the model produced, with enough metadata to log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    /// The model stopped at the token limit.
    pub truncated: bool,
    pub usage: TokenUsage,
}

/// Single-prompt text completion. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Completer: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`LlmError`] when the provider cannot be reached, rejects
    /// the request, or answers with an unrecognised body.
    async fn complete(&self, prompt: &Prompt<'_>) -> Result<Completion, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
