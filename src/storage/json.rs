// src/storage/json.rs
// Single-file JSON card store, the local stand-in for the hosted database.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{sort_by_due, CardStore, Result, StoreError};
use crate::deck::{Card, CardId, Deck, DeckId};
use crate::stats::DayStreak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreDocument {
    decks: Vec<Deck>,
    cards: Vec<Card>,
    streak: DayStreak,
}

/// Keeps the whole collection in memory and rewrites the file on every change.
pub struct JsonFileStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            StoreDocument::default()
        };
        info!("opened card file {:?} ({} cards)", path, doc.cards.len());
        Ok(Self { path: path.to_path_buf(), doc })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.doc)?;
        fs::write(&self.path, content).map_err(|e| {
            warn!("could not write {:?}: {}", self.path, e);
            StoreError::from(e)
        })
    }

    /// Applies `change` and writes the file; the in-memory copy is restored if the write fails.
    fn commit(&mut self, change: impl FnOnce(&mut StoreDocument)) -> Result<()> {
        let previous = self.doc.clone();
        change(&mut self.doc);
        if let Err(e) = self.flush() {
            self.doc = previous;
            return Err(e);
        }
        Ok(())
    }
}

impl CardStore for JsonFileStore {
    fn load_card(&self, id: CardId) -> Result<Card> {
        self.doc
            .cards
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or(StoreError::CardNotFound(id))
    }

    fn save_card(&mut self, card: &Card) -> Result<()> {
        if !self.doc.decks.iter().any(|d| d.id == card.deck_id) {
            return Err(StoreError::DeckNotFound(card.deck_id));
        }
        let id = card.id();
        let card = card.clone();
        self.commit(|doc| match doc.cards.iter_mut().find(|c| c.id() == id) {
            Some(existing) => *existing = card,
            None => doc.cards.push(card),
        })
    }

    fn delete_card(&mut self, id: CardId) -> Result<()> {
        if !self.doc.cards.iter().any(|c| c.id() == id) {
            return Err(StoreError::CardNotFound(id));
        }
        self.commit(|doc| doc.cards.retain(|c| c.id() != id))
    }

    fn cards_in_deck(&self, deck_id: DeckId) -> Result<Vec<Card>> {
        let mut cards: Vec<Card> = self
            .doc
            .cards
            .iter()
            .filter(|c| c.deck_id == deck_id)
            .cloned()
            .collect();
        sort_by_due(&mut cards);
        Ok(cards)
    }

    fn all_cards(&self) -> Result<Vec<Card>> {
        let mut cards = self.doc.cards.clone();
        sort_by_due(&mut cards);
        Ok(cards)
    }

    fn save_deck(&mut self, deck: &Deck) -> Result<()> {
        let id = deck.id;
        let deck = deck.clone();
        self.commit(|doc| match doc.decks.iter_mut().find(|d| d.id == id) {
            Some(existing) => *existing = deck,
            None => doc.decks.push(deck),
        })
    }

    fn delete_deck(&mut self, id: DeckId) -> Result<()> {
        if !self.doc.decks.iter().any(|d| d.id == id) {
            return Err(StoreError::DeckNotFound(id));
        }
        self.commit(|doc| {
            doc.decks.retain(|d| d.id != id);
            doc.cards.retain(|c| c.deck_id != id);
        })
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        let mut decks = self.doc.decks.clone();
        decks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(decks)
    }

    fn load_streak(&self) -> Result<DayStreak> {
        Ok(self.doc.streak.clone())
    }

    fn save_streak(&mut self, streak: &DayStreak) -> Result<()> {
        let streak = streak.clone();
        self.commit(|doc| doc.streak = streak)
    }
}
