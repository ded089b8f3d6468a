// src/storage/db.rs
// Manages the SQLite database for storing decks, cards and review state.

use std::fs;
use std::path::Path;

use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{sort_by_due, CardStore, Result, StoreError};
use crate::debug::Tracer;
use crate::deck::{Card, CardId, CardSnapshot, Deck, DeckId};
use crate::stats::DayStreak;

const CARD_COLUMNS: &str = "id, deck_id, front, hint, example, created_at, \
    confidence, review_count, last_reviewed_at, next_review_at";

pub struct SqliteCardStore {
    conn: Connection,
}

impl SqliteCardStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!("opened card database {:?}", path);
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = SqliteCardStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates the necessary tables if they don't already exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS decks (
                id              BLOB PRIMARY KEY,
                name            TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS cards (
                id                  BLOB PRIMARY KEY,
                deck_id             BLOB NOT NULL,
                front               TEXT NOT NULL,
                hint                TEXT NOT NULL,
                example             TEXT NOT NULL,
                created_at          TEXT NOT NULL,
                confidence          REAL NOT NULL,
                review_count        INTEGER NOT NULL,
                last_reviewed_at    TEXT,
                next_review_at      TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS cards_by_deck ON cards (deck_id, next_review_at);
            CREATE TABLE IF NOT EXISTS study_streak (
                id                  INTEGER PRIMARY KEY CHECK (id = 0),
                days                INTEGER NOT NULL,
                last_study_date     TEXT
            );",
        )?;
        Ok(())
    }

    fn deck_exists(&self, deck_id: DeckId) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM decks WHERE id = ?1", [deck_id.0], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn query_cards(&self, sql: &str, deck_id: Option<DeckId>) -> Result<Vec<Card>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match deck_id {
            Some(id) => stmt.query_map([id.0], card_from_row)?,
            None => stmt.query_map([], card_from_row)?,
        };

        let mut cards = Vec::new();
        for card in rows {
            cards.push(card.map_err(corrupt_or_sqlite)?);
        }
        sort_by_due(&mut cards);
        Ok(cards)
    }
}

fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    Ok(Card {
        review: CardSnapshot {
            id: CardId(row.get(0)?),
            confidence: row.get(6)?,
            review_count: row.get(7)?,
            last_reviewed_at: row.get(8)?,
            next_review_at: row.get(9)?,
        },
        deck_id: DeckId(row.get(1)?),
        front: row.get(2)?,
        hint: row.get(3)?,
        example: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn corrupt_or_sqlite(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::IntegralValueOutOfRange(column, value) => {
            StoreError::Corrupt(format!("column {} holds out-of-range value {}", column, value))
        }
        other => StoreError::Sqlite(other),
    }
}

impl CardStore for SqliteCardStore {
    fn load_card(&self, id: CardId) -> Result<Card> {
        let sql = format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS);
        self.conn
            .query_row(&sql, [id.0], card_from_row)
            .optional()
            .map_err(corrupt_or_sqlite)?
            .ok_or(StoreError::CardNotFound(id))
    }

    /// Uses `INSERT OR REPLACE` to handle both new and existing cards.
    fn save_card(&mut self, card: &Card) -> Result<()> {
        if !self.deck_exists(card.deck_id)? {
            return Err(StoreError::DeckNotFound(card.deck_id));
        }
        let sql = format!(
            "INSERT OR REPLACE INTO cards ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            CARD_COLUMNS
        );
        self.conn.execute(
            &sql,
            params![
                card.id().0,
                card.deck_id.0,
                card.front,
                card.hint,
                card.example,
                card.created_at,
                card.review.confidence,
                card.review.review_count,
                card.review.last_reviewed_at,
                card.review.next_review_at,
            ],
        )?;
        Ok(())
    }

    fn delete_card(&mut self, id: CardId) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM cards WHERE id = ?1", [id.0])?;
        if removed == 0 {
            return Err(StoreError::CardNotFound(id));
        }
        Ok(())
    }

    fn cards_in_deck(&self, deck_id: DeckId) -> Result<Vec<Card>> {
        let _tracer = Tracer::new("cards_in_deck");
        let sql = format!(
            "SELECT {} FROM cards WHERE deck_id = ?1 ORDER BY next_review_at",
            CARD_COLUMNS
        );
        self.query_cards(&sql, Some(deck_id))
    }

    fn all_cards(&self) -> Result<Vec<Card>> {
        let _tracer = Tracer::new("all_cards");
        let sql = format!("SELECT {} FROM cards", CARD_COLUMNS);
        self.query_cards(&sql, None)
    }

    fn save_deck(&mut self, deck: &Deck) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO decks (id, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![deck.id.0, deck.name, deck.created_at, deck.updated_at],
        )?;
        Ok(())
    }

    /// Deletes the deck and its cards in one transaction.
    fn delete_deck(&mut self, id: DeckId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let cards = tx.execute("DELETE FROM cards WHERE deck_id = ?1", [id.0])?;
        let removed = tx.execute("DELETE FROM decks WHERE id = ?1", [id.0])?;
        if removed == 0 {
            // Dropping `tx` rolls back.
            return Err(StoreError::DeckNotFound(id));
        }
        tx.commit()?;
        info!("deleted deck {} and {} cards", id, cards);
        Ok(())
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at, updated_at FROM decks")?;
        let rows = stmt.query_map([], |row| {
            Ok(Deck {
                id: DeckId(row.get(0)?),
                name: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut decks = Vec::new();
        for deck in rows {
            decks.push(deck?);
        }
        decks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(decks)
    }

    fn load_streak(&self) -> Result<DayStreak> {
        let streak = self
            .conn
            .query_row("SELECT days, last_study_date FROM study_streak WHERE id = 0", [], |row| {
                Ok(DayStreak {
                    days: row.get(0)?,
                    last_study_date: row.get(1)?,
                })
            })
            .optional()
            .map_err(corrupt_or_sqlite)?;
        Ok(streak.unwrap_or_default())
    }

    fn save_streak(&mut self, streak: &DayStreak) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO study_streak (id, days, last_study_date) VALUES (0, ?1, ?2)",
            params![streak.days, streak.last_study_date],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn store_with_deck() -> (SqliteCardStore, Deck) {
        let mut store = SqliteCardStore::open_in_memory().unwrap();
        let deck = Deck::new("Spanish".to_string());
        store.save_deck(&deck).unwrap();
        (store, deck)
    }

    #[test]
    fn test_card_round_trip() {
        let (mut store, deck) = store_with_deck();
        let mut card = Card::new(deck.id, "perro".into(), "dog".into(), "El perro ladra.".into());
        card.review.confidence = 0.7;
        card.review.review_count = 3;
        card.review.last_reviewed_at = Some(Utc::now());
        card.review.next_review_at = Utc::now() + Duration::milliseconds(207_360_000);
        store.save_card(&card).unwrap();

        let loaded = store.load_card(card.id()).unwrap();
        assert_eq!(loaded, card);
    }

    #[test]
    fn test_save_replaces_existing_card() {
        let (mut store, deck) = store_with_deck();
        let mut card = Card::new(deck.id, "gato".into(), "cat".into(), "".into());
        store.save_card(&card).unwrap();

        card.review.review_count = 1;
        card.review.confidence = 0.2;
        store.save_card(&card).unwrap();

        assert_eq!(store.all_cards().unwrap().len(), 1);
        assert_eq!(store.load_card(card.id()).unwrap().review.review_count, 1);
    }

    #[test]
    fn test_cards_in_deck_sorted_by_due() {
        let (mut store, deck) = store_with_deck();
        let other = Deck::new("French".to_string());
        store.save_deck(&other).unwrap();

        let now = Utc::now();
        let later = now + Duration::hours(5);
        let late = Card::new_at(deck.id, "tarde".into(), "".into(), "".into(), later);
        let early = Card::new_at(deck.id, "pronto".into(), "".into(), "".into(), now);
        let elsewhere = Card::new_at(other.id, "chat".into(), "".into(), "".into(), now);
        for card in [&late, &early, &elsewhere] {
            store.save_card(card).unwrap();
        }

        let ids: Vec<CardId> = store.cards_in_deck(deck.id).unwrap().iter().map(Card::id).collect();
        assert_eq!(ids, vec![early.id(), late.id()]);
    }

    #[test]
    fn test_delete_deck_removes_its_cards() {
        let (mut store, deck) = store_with_deck();
        let other = Deck::new("French".to_string());
        store.save_deck(&other).unwrap();
        let card = Card::new(deck.id, "perro".into(), "dog".into(), "".into());
        let kept = Card::new(other.id, "chien".into(), "dog".into(), "".into());
        store.save_card(&card).unwrap();
        store.save_card(&kept).unwrap();

        store.delete_deck(deck.id).unwrap();
        assert_eq!(store.list_decks().unwrap(), vec![other]);
        assert!(matches!(store.load_card(card.id()), Err(StoreError::CardNotFound(_))));
        assert_eq!(store.all_cards().unwrap(), vec![kept]);

        assert!(matches!(store.delete_deck(deck.id), Err(StoreError::DeckNotFound(_))));
    }

    #[test]
    fn test_missing_records() {
        let (mut store, _deck) = store_with_deck();
        let id = CardId::new();
        assert!(matches!(store.load_card(id), Err(StoreError::CardNotFound(_))));
        assert!(matches!(store.delete_card(id), Err(StoreError::CardNotFound(_))));

        let orphan = Card::new(DeckId::new(), "x".into(), "".into(), "".into());
        assert!(matches!(store.save_card(&orphan), Err(StoreError::DeckNotFound(_))));
    }

    #[test]
    fn test_negative_review_count_is_corrupt() {
        let (mut store, deck) = store_with_deck();
        let card = Card::new(deck.id, "x".into(), "".into(), "".into());
        store.save_card(&card).unwrap();
        store
            .conn
            .execute("UPDATE cards SET review_count = -1 WHERE id = ?1", [card.id().0])
            .unwrap();

        assert!(matches!(store.load_card(card.id()), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_streak_round_trip() {
        let (mut store, _deck) = store_with_deck();
        assert_eq!(store.load_streak().unwrap(), DayStreak::default());

        let streak = DayStreak {
            days: 3,
            last_study_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        };
        store.save_streak(&streak).unwrap();
        assert_eq!(store.load_streak().unwrap(), streak);
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history").join("cards.db");
        let deck = Deck::new("Spanish".to_string());
        {
            let mut store = SqliteCardStore::open(&path).unwrap();
            store.save_deck(&deck).unwrap();
        }
        let store = SqliteCardStore::open(&path).unwrap();
        assert_eq!(store.list_decks().unwrap(), vec![deck]);
    }
}
