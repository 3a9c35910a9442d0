//! Tarot deck: opaque card identifiers, display names, and spreads.
//!
//! DESIGN
//! ======
//! A card is identified by a lowercase slug (`the_fool`, `three_of_cups`).
//! Nothing downstream interprets the slug; the engine only forwards the
//! display name to the text-generation collaborator.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

const MAJOR_ARCANA: [&str; 22] = [
    "the_fool",
    "the_magician",
    "the_high_priestess",
    "the_empress",
    "the_emperor",
    "the_hierophant",
    "the_lovers",
    "the_chariot",
    "strength",
    "the_hermit",
    "wheel_of_fortune",
    "justice",
    "the_hanged_man",
    "death",
    "temperance",
    "the_devil",
    "the_tower",
    "the_star",
    "the_moon",
    "the_sun",
    "judgement",
    "the_world",
];

const SUITS: [&str; 4] = ["wands", "cups", "swords", "pentacles"];

const RANKS: [&str; 14] = [
    "ace", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "page", "knight", "queen", "king",
];

/// Words kept lowercase in display names unless they lead.
const CONNECTIVES: [&str; 1] = ["of"];

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = MAJOR_ARCANA.len() + SUITS.len() * RANKS.len();

// =============================================================================
// CARD
// =============================================================================

/// Opaque identifier for a drawn tarot card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(String);

impl Card {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Title-cased name for prompts and output, e.g. `Three of Cups`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.0
            .split('_')
            .filter(|w| !w.is_empty())
            .enumerate()
            .map(|(i, word)| {
                if i > 0 && CONNECTIVES.contains(&word) {
                    word.to_string()
                } else {
                    capitalize(word)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether this id names a card of the standard deck.
    #[must_use]
    pub fn is_known(&self) -> bool {
        full_deck().contains(self)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// All 78 cards: major arcana in order, then minors by suit and rank.
#[must_use]
pub fn full_deck() -> Vec<Card> {
    let mut deck: Vec<Card> = MAJOR_ARCANA.iter().map(|id| Card::new(*id)).collect();
    for suit in SUITS {
        for rank in RANKS {
            deck.push(Card::new(format!("{rank}_of_{suit}")));
        }
    }
    deck
}

/// Draw one card uniformly from the full deck.
pub fn draw_one<R: Rng + ?Sized>(rng: &mut R) -> Card {
    let deck = full_deck();
    // full_deck is never empty
    deck.choose(rng).cloned().unwrap_or_else(|| Card::new(MAJOR_ARCANA[0]))
}

// =============================================================================
// SPREADS
// =============================================================================

/// Named layout of card positions drawn together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spread {
    Single,
    ThreeCard,
    Horseshoe,
    CelticCross,
}

impl Spread {
    /// Position labels, in draw order.
    #[must_use]
    pub fn positions(self) -> &'static [&'static str] {
        match self {
            Self::Single => &["Focus"],
            Self::ThreeCard => &["Past", "Present", "Future"],
            Self::Horseshoe => {
                &["Past", "Present", "Hidden influences", "Obstacles", "Surroundings", "Advice", "Outcome"]
            }
            Self::CelticCross => &[
                "Present",
                "Challenge",
                "Foundation",
                "Recent past",
                "Potential",
                "Near future",
                "Self",
                "Environment",
                "Hopes and fears",
                "Outcome",
            ],
        }
    }

    #[must_use]
    pub fn size(self) -> usize {
        self.positions().len()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::ThreeCard => "three_card",
            Self::Horseshoe => "horseshoe",
            Self::CelticCross => "celtic_cross",
        }
    }

    /// Draw `size()` distinct cards without replacement.
    pub fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<Card> {
        full_deck()
            .choose_multiple(rng, self.size())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown spread: {0}")]
pub struct UnknownSpread(pub String);

impl FromStr for Spread {
    type Err = UnknownSpread;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single" => Ok(Self::Single),
            "three_card" => Ok(Self::ThreeCard),
            "horseshoe" => Ok(Self::Horseshoe),
            "celtic_cross" => Ok(Self::CelticCross),
            _ => Err(UnknownSpread(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "deck_test.rs"]
mod tests;
