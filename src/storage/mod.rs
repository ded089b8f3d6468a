// src/storage/mod.rs
// This module handles all data persistence: the card stores and the review journal.

pub mod db;
pub mod json;
pub mod replay_log;

use thiserror::Error;

use crate::deck::{Card, CardId, Deck, DeckId};
use crate::stats::DayStreak;

// Re-export the main structs for easier access.
pub use self::db::SqliteCardStore;
pub use self::json::JsonFileStore;
pub use self::replay_log::ReviewJournal;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Deck not found: {0}")]
    DeckNotFound(DeckId),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence for cards, decks and the study streak.
///
/// The scheduler never touches a store; the study session loads a card,
/// schedules it and hands the result back through `save_card`.
pub trait CardStore {
    fn load_card(&self, id: CardId) -> Result<Card>;
    /// Inserts or replaces a card. Its deck must exist.
    fn save_card(&mut self, card: &Card) -> Result<()>;
    fn delete_card(&mut self, id: CardId) -> Result<()>;
    /// Cards of one deck, earliest `next_review_at` first.
    fn cards_in_deck(&self, deck_id: DeckId) -> Result<Vec<Card>>;
    fn all_cards(&self) -> Result<Vec<Card>>;

    fn save_deck(&mut self, deck: &Deck) -> Result<()>;
    /// Removes a deck together with all of its cards.
    fn delete_deck(&mut self, id: DeckId) -> Result<()>;
    /// Decks in creation order.
    fn list_decks(&self) -> Result<Vec<Deck>>;

    fn load_streak(&self) -> Result<DayStreak>;
    fn save_streak(&mut self, streak: &DayStreak) -> Result<()>;
}

pub(crate) fn sort_by_due(cards: &mut [Card]) {
    cards.sort_by(|a, b| {
        a.review
            .next_review_at
            .cmp(&b.review.next_review_at)
            .then(a.created_at.cmp(&b.created_at))
    });
}
