//! Application configuration parsed from environment variables.
//!
//! Missing or unparseable numeric values fall back to their defaults; an
//! unknown response format is an error because it changes what counts as a
//! valid reading.

use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tarot.db";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 1;
pub const DEFAULT_INSIGHT_MAX_TOKENS: u32 = 512;

/// Parse `key` from the environment, falling back to `default`.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    parse_or(std::env::var(key).ok().as_deref(), default)
}

/// Parse an optional raw value, falling back to `default` when absent or invalid.
pub fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported INSIGHT_RESPONSE_FORMAT '{0}' (expected 'text' or 'json')")]
    ResponseFormat(String),
}

/// How the collaborator's reply is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Whole reply text is the reading.
    #[default]
    Text,
    /// Reply must be `{"description": "..."}`.
    Json,
}

impl FromStr for ResponseFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::ResponseFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub insight_max_tokens: u32,
    pub response_format: ResponseFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            insight_max_tokens: DEFAULT_INSIGHT_MAX_TOKENS,
            response_format: ResponseFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read `DATABASE_URL`, `DB_MAX_CONNECTIONS`, `INSIGHT_MAX_TOKENS` and
    /// `INSIGHT_RESPONSE_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown response format.
    pub fn from_env() -> Result<Self, ConfigError> {
        let response_format = match std::env::var("INSIGHT_RESPONSE_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => ResponseFormat::default(),
        };
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS).max(1),
            insight_max_tokens: env_parse("INSIGHT_MAX_TOKENS", DEFAULT_INSIGHT_MAX_TOKENS),
            response_format,
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
