//! Provider selection and connection settings from `LLM_*` variables.
//!
//! `LlmConfig::from_lookup` takes the variable source as a closure so the
//! parsing rules can be exercised without touching the process environment.

use std::str::FromStr;

use super::types::LlmError;
use crate::config::parse_or;

pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Anthropic,
    OpenAi,
}

impl LlmProviderKind {
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    /// Env var that holds the key unless `LLM_API_KEY_ENV` names another.
    #[must_use]
    pub fn default_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Anthropic => super::anthropic::DEFAULT_BASE_URL,
            Self::OpenAi => super::openai::DEFAULT_BASE_URL,
        }
    }

    fn completion_path(self) -> &'static str {
        match self {
            Self::Anthropic => super::anthropic::COMPLETION_PATH,
            Self::OpenAi => super::openai::COMPLETION_PATH,
        }
    }
}

impl FromStr for LlmProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(LlmError::Config(format!("unknown LLM_PROVIDER '{other}' (expected 'anthropic' or 'openai')"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: String,
    pub model: String,
    /// API root without a trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Read the process environment. See [`LlmConfig::from_lookup`].
    ///
    /// # Errors
    ///
    /// Same as [`LlmConfig::from_lookup`].
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Variables, all optional except the key itself:
    /// - `LLM_PROVIDER`: `anthropic` (default) or `openai`
    /// - `LLM_API_KEY_ENV`: name of the variable holding the key
    ///   (default `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`)
    /// - `LLM_MODEL`, `LLM_BASE_URL`: provider defaults when absent
    /// - `LLM_REQUEST_TIMEOUT_SECS` (60), `LLM_CONNECT_TIMEOUT_SECS` (10)
    ///
    /// Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider or a missing/blank key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match var("LLM_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => LlmProviderKind::Anthropic,
        };
        let key_var = var("LLM_API_KEY_ENV").unwrap_or_else(|| provider.default_key_env().to_string());
        let api_key = var(&key_var).ok_or(LlmError::MissingApiKey { var: key_var })?;
        let model = var("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let base_url = var("LLM_BASE_URL")
            .map_or_else(|| provider.default_base_url().to_string(), |url| url.trim().trim_end_matches('/').to_string());
        let timeouts = LlmTimeouts {
            request_secs: parse_or(var("LLM_REQUEST_TIMEOUT_SECS").as_deref(), DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(var("LLM_CONNECT_TIMEOUT_SECS").as_deref(), DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { provider, api_key: api_key.trim().to_string(), model, base_url, timeouts })
    }

    /// Full URL the completion request is posted to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.provider.completion_path())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
