// src/deck/mod.rs
// Cards, decks and the review fields the scheduler works on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque card identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(pub Uuid);

impl DeckId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeckId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DeckId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The review fields of a card. This is all the scheduler reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub id: CardId,
    /// Mastery estimate in [0.0, 1.0].
    pub confidence: f64,
    pub review_count: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_review_at: DateTime<Utc>,
}

impl CardSnapshot {
    /// A never-reviewed card, due immediately.
    pub fn unreviewed(id: CardId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            confidence: 0.0,
            review_count: 0,
            last_reviewed_at: None,
            next_review_at: now,
        }
    }
}

impl AsRef<CardSnapshot> for CardSnapshot {
    fn as_ref(&self) -> &CardSnapshot {
        self
    }
}

/// A vocabulary card as held by a card store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(flatten)]
    pub review: CardSnapshot,
    pub deck_id: DeckId,
    pub front: String,
    pub hint: String,
    pub example: String,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(deck_id: DeckId, front: String, hint: String, example: String) -> Self {
        Self::new_at(deck_id, front, hint, example, Utc::now())
    }

    pub fn new_at(
        deck_id: DeckId,
        front: String,
        hint: String,
        example: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            review: CardSnapshot::unreviewed(CardId::new(), now),
            deck_id,
            front,
            hint,
            example,
            created_at: now,
        }
    }

    pub fn id(&self) -> CardId {
        self.review.id
    }
}

impl AsRef<CardSnapshot> for Card {
    fn as_ref(&self) -> &CardSnapshot {
        &self.review
    }
}

/// A named grouping of cards. Carries no scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: DeckId::new(),
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Converts a legacy 0-5 integer score to the canonical [0, 1] scale.
///
/// Used when reading cards kept on the old integer scale.
pub fn confidence_from_five_point(score: u8) -> f64 {
    f64::from(score.min(5)) / 5.0
}

/// Converts a [0, 1] confidence to the legacy 0-5 integer score.
///
/// Rounds down, so a score of 4 or more means the card is mastered
/// (confidence >= 0.8). The small epsilon keeps values such as 0.6 from
/// landing at 2.9999999 and dropping a point.
pub fn confidence_to_five_point(confidence: f64) -> u8 {
    (confidence.clamp(0.0, 1.0) * 5.0 + 1e-9).floor() as u8
}
