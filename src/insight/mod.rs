//! Insight: topic readings with bounded, user-driven retries.

pub mod engine;
pub mod generator;
pub mod state;

pub use engine::InsightEngine;
pub use generator::{InsightGenerator, InsightRequest, LlmInsightGenerator};
pub use state::{EngineState, Insight, InsightError, InsightView, MAX_RETRIES};
