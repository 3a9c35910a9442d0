//! Tarot readings with an LLM-backed insight engine and an on-device
//! card-of-the-day history.

pub mod config;
pub mod db;
pub mod deck;
pub mod error;
pub mod insight;
pub mod llm;
pub mod services;
pub mod topic;
