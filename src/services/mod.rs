//! Persistence-backed services used by the driver.
//!
//! ARCHITECTURE
//! ============
//! Service modules own storage and the policies layered on it so the
//! driver stays focused on argument parsing and output.

pub mod daily;
pub mod settings;

use crate::error::ErrorCode;

/// Errors from the on-device stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A timestamp fell outside the persisted range.
    #[error("timestamp out of range: {0}")]
    Timestamp(String),

    /// A persisted value could not be interpreted.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
            Self::Timestamp(_) => "E_TIMESTAMP",
            Self::InvalidValue { .. } => "E_INVALID_VALUE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)))
    }
}
