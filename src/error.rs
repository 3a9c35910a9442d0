//! Error classification shared by every subsystem.
//!
//! DESIGN
//! ======
//! Each error enum carries a stable, grepable code and a retryable flag so
//! the driver can decide whether to offer a retry without matching on
//! concrete types. `ErrorReport` is the flattened form handed to display.

use serde::Serialize;

/// Stable machine-readable classification for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Flattened error suitable for display or logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ErrorReport {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if self.retryable {
            write!(f, " (retryable)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
