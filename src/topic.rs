//! Insight topics: the closed set of interest categories a user can ask about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Interest category driving which reading is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Love,
    Career,
    Mood,
    Finance,
    Future,
}

impl Topic {
    pub const ALL: [Topic; 5] = [Self::Love, Self::Career, Self::Mood, Self::Finance, Self::Future];

    /// Lowercase key used on the wire and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Career => "career",
            Self::Mood => "mood",
            Self::Finance => "finance",
            Self::Future => "future",
        }
    }

    /// Human title interpolated into prompts.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Love => "Love & Relationships",
            Self::Career => "Career & Work",
            Self::Mood => "Mood & Wellbeing",
            Self::Finance => "Money & Finance",
            Self::Future => "The Near Future",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

#[cfg(test)]
#[path = "topic_test.rs"]
mod tests;
