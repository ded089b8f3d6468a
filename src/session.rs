// src/session.rs
// State for one study pass: shown cards, the correct-answer streak and the card on screen.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use thiserror::Error;

use crate::config::Config;
use crate::deck::{Card, CardId, CardSnapshot};
use crate::scheduler::{apply_outcome, Outcome, SchedulerError};
use crate::selection::{mark_shown, policy_for, select_next, SelectionPolicy, ShownSet};
use crate::storage::{CardStore, ReviewJournal, StoreError};
use crate::streak::{Milestone, MilestoneTracker};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a successfully recorded review produced.
#[derive(Debug, Clone)]
pub struct ReviewReport {
    pub card: Card,
    pub milestone: Option<Milestone>,
}

pub struct StudySession {
    config: Config,
    policy: Box<dyn SelectionPolicy>,
    shown: ShownSet,
    streak: MilestoneTracker,
    journal: Option<ReviewJournal>,
    current: Option<CardId>,
}

impl StudySession {
    pub fn new(config: Config) -> Self {
        let policy = policy_for(config.session.strategy);
        Self::with_policy(config, policy)
    }

    pub fn with_policy(config: Config, policy: Box<dyn SelectionPolicy>) -> Self {
        let streak = MilestoneTracker::from_config(&config.session);
        Self {
            config,
            policy,
            shown: ShownSet::new(),
            streak,
            journal: None,
            current: None,
        }
    }

    pub fn with_journal(mut self, journal: ReviewJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Picks the next card and marks it shown. `None` only for an empty card list.
    pub fn next_card<'c, T: AsRef<CardSnapshot>>(&mut self, cards: &'c [T]) -> Option<&'c T> {
        let card = select_next(self.policy.as_mut(), cards, &mut self.shown)?;
        let id = AsRef::<CardSnapshot>::as_ref(card).id;
        mark_shown(&mut self.shown, id);
        self.current = Some(id);
        Some(card)
    }

    /// Schedules and saves one review.
    ///
    /// On any failure the streak is left alone, and if the card is the one on
    /// screen it goes back into the pass, so nothing looks recorded that was not saved.
    pub fn record_outcome(
        &mut self,
        store: &mut dyn CardStore,
        card_id: CardId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<ReviewReport, SessionError> {
        let card = match self.schedule_and_save(store, card_id, outcome, now) {
            Ok(card) => card,
            Err(e) => {
                warn!("review of card {} not recorded: {}", card_id, e);
                if self.current == Some(card_id) {
                    self.shown.remove(card_id);
                }
                return Err(e);
            }
        };

        let milestone = self.streak.record(outcome, now);
        self.update_day_streak(store, now);
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.log_review(&card.review, outcome, now) {
                warn!("could not append to {:?}: {}", journal.path(), e);
            }
        }

        Ok(ReviewReport { card, milestone })
    }

    fn schedule_and_save(
        &self,
        store: &mut dyn CardStore,
        card_id: CardId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<Card, SessionError> {
        let mut card = store.load_card(card_id)?;
        card.review = apply_outcome(&self.config.scheduler, &card.review, outcome, now)?;
        store.save_card(&card)?;
        debug!("saved review {} of card {}", card.review.review_count, card_id);
        Ok(card)
    }

    fn update_day_streak(&self, store: &mut dyn CardStore, now: DateTime<Utc>) {
        let result = store.load_streak().and_then(|mut streak| {
            streak.record_study(now);
            store.save_streak(&streak)
        });
        if let Err(e) = result {
            warn!("could not update study streak: {}", e);
        }
    }

    /// Starts the pass over, making every card eligible again.
    pub fn reset_pass(&mut self) {
        self.shown.clear();
    }

    pub fn current(&self) -> Option<CardId> {
        self.current
    }

    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    pub fn correct_in_a_row(&self) -> u32 {
        self.streak.count()
    }

    pub fn is_celebrating(&mut self, now: DateTime<Utc>) -> bool {
        self.streak.tick(now);
        self.streak.is_celebrating(now)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
