// LexyVocab
// Review scheduling for vocabulary flashcards.

pub mod config;
pub mod debug;
pub mod deck;
pub mod scheduler;
pub mod selection;
pub mod session;
pub mod stats;
pub mod storage;
pub mod streak;

pub use config::Config;
pub use deck::{Card, CardId, CardSnapshot, Deck, DeckId};
pub use scheduler::{apply_outcome, Outcome, SchedulerError};
pub use selection::{mark_shown, select_next, SelectionPolicy, ShownSet};
pub use session::{SessionError, StudySession};
pub use storage::{CardStore, StoreError};
