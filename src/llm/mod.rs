//! LLM: hosted text completion for readings and daily advice.
//!
//! DESIGN
//! ======
//! Providers differ only in wire format, so each provider module is a pair
//! of pure functions (`request_body`, `parse_completion`) and `LlmClient`
//! owns the single HTTP path: build, authenticate, post, check status,
//! decode. Callers depend on the `Completer` trait so tests can substitute
//! a scripted model.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod types;

use std::time::Duration;

use tracing::debug;

use config::{LlmConfig, LlmProviderKind};
pub use types::{Completer, Completion, LlmError, Prompt};

pub struct LlmClient {
    http: reqwest::Client,
    provider: LlmProviderKind,
    api_key: String,
    model: String,
    endpoint: String,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the config is incomplete or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        let endpoint = config.endpoint();
        Ok(Self { http, provider: config.provider, api_key: config.api_key, model: config.model, endpoint })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, prompt: &Prompt<'_>) -> reqwest::RequestBuilder {
        let post = self.http.post(&self.endpoint);
        match self.provider {
            LlmProviderKind::Anthropic => post
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", anthropic::API_VERSION)
                .json(&anthropic::request_body(&self.model, prompt)),
            LlmProviderKind::OpenAi => post
                .bearer_auth(&self.api_key)
                .json(&openai::request_body(&self.model, prompt)),
        }
    }
}

#[async_trait::async_trait]
impl Completer for LlmClient {
    async fn complete(&self, prompt: &Prompt<'_>) -> Result<Completion, LlmError> {
        debug!(provider = ?self.provider, model = %self.model, max_tokens = prompt.max_tokens, "llm: request");
        let response = self
            .request(prompt)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        match self.provider {
            LlmProviderKind::Anthropic => anthropic::parse_completion(&body),
            LlmProviderKind::OpenAi => openai::parse_completion(&body),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
