//! Insight state: the four-state machine and its pure transitions.
//!
//! DESIGN
//! ======
//! `EngineState` is a sum type: `Idle → Loading → Loaded | Failed`. All
//! transitions here are pure so the engine only has to serialize them and
//! publish the result. Failures never escape as errors: they become
//! `Failed` with a retry count, and `can_retry` decides whether the driver
//! may offer another attempt.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ErrorReport};
use crate::topic::Topic;

/// Consecutive failures allowed for one topic before retry is refused.
pub const MAX_RETRIES: u32 = 3;

// =============================================================================
// TYPES
// =============================================================================

/// A generated reading for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub topic: Topic,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsightError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("max retries reached ({max})")]
    MaxRetriesReached { max: u32 },
}

impl ErrorCode for InsightError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::InvalidResponse(_) => "E_INVALID_RESPONSE",
            Self::MaxRetriesReached { .. } => "E_MAX_RETRIES",
        }
    }

    fn retryable(&self) -> bool {
        !matches!(self, Self::MaxRetriesReached { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No topic chosen yet.
    #[default]
    Idle,
    /// Request in flight. `retry_count` is the failure count carried into it.
    Loading { topic: Topic, retry_count: u32 },
    Loaded(Insight),
    Failed { topic: Topic, retry_count: u32, error: InsightError },
}

/// What `retry` should do from the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RetryPlan {
    /// Re-issue the request for `topic`, carrying `retry_count` forward.
    Dispatch { topic: Topic, retry_count: u32 },
    /// Cap reached; move to this terminal state without a call.
    Exhausted(EngineState),
    /// Not in `Failed`; nothing to retry.
    Ignore,
}

impl EngineState {
    #[must_use]
    pub fn topic(&self) -> Option<Topic> {
        match self {
            Self::Idle => None,
            Self::Loading { topic, .. } | Self::Failed { topic, .. } => Some(*topic),
            Self::Loaded(insight) => Some(insight.topic),
        }
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        match self {
            Self::Loading { retry_count, .. } | Self::Failed { retry_count, .. } => *retry_count,
            Self::Idle | Self::Loaded(_) => 0,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    #[must_use]
    pub fn insight(&self) -> Option<&Insight> {
        match self {
            Self::Loaded(insight) => Some(insight),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&InsightError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// True only in `Failed` below the retry cap.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        match self {
            Self::Failed { retry_count, error, .. } => *retry_count < MAX_RETRIES && error.retryable(),
            _ => false,
        }
    }

    /// Apply the outcome of the in-flight request. `None` when not loading.
    pub(crate) fn complete(&self, outcome: Result<String, InsightError>) -> Option<Self> {
        let Self::Loading { topic, retry_count } = *self else {
            return None;
        };
        let outcome = outcome.and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(InsightError::InvalidResponse("empty reading".into()))
            } else {
                Ok(text.to_string())
            }
        });
        Some(match outcome {
            Ok(text) => Self::Loaded(Insight { topic, text }),
            Err(error) => Self::Failed { topic, retry_count: (retry_count + 1).min(MAX_RETRIES), error },
        })
    }

    pub(crate) fn retry_plan(&self) -> RetryPlan {
        match self {
            Self::Failed { topic, retry_count, .. } if *retry_count >= MAX_RETRIES => {
                RetryPlan::Exhausted(Self::Failed {
                    topic: *topic,
                    retry_count: *retry_count,
                    error: InsightError::MaxRetriesReached { max: MAX_RETRIES },
                })
            }
            Self::Failed { topic, retry_count, error } if error.retryable() => {
                RetryPlan::Dispatch { topic: *topic, retry_count: *retry_count }
            }
            _ => RetryPlan::Ignore,
        }
    }

    /// Project the state into what the driver should render.
    #[must_use]
    pub fn view(&self) -> InsightView {
        match self {
            Self::Idle => InsightView::Empty,
            Self::Loading { topic, .. } => InsightView::Spinner { topic: *topic },
            Self::Loaded(insight) => InsightView::Content { topic: insight.topic, text: insight.text.clone() },
            Self::Failed { topic, error, .. } => InsightView::Error {
                topic: *topic,
                report: ErrorReport::from_error(error),
                show_retry: self.can_retry(),
            },
        }
    }
}

/// Display projection of [`EngineState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightView {
    Empty,
    Spinner { topic: Topic },
    Content { topic: Topic, text: String },
    Error { topic: Topic, report: ErrorReport, show_retry: bool },
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
