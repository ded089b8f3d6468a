// src/selection.rs
// Picks the next card of a study pass.

use std::collections::HashSet;

use log::info;
use rand::rngs::{StdRng, ThreadRng};
use rand::{thread_rng, Rng, SeedableRng};

use crate::config::SelectionStrategy;
use crate::deck::{CardId, CardSnapshot};

/// Ids of the cards already shown in the current pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShownSet {
    ids: HashSet<CardId>,
}

impl ShownSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.ids.contains(&id)
    }

    pub fn insert(&mut self, id: CardId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: CardId) -> bool {
        self.ids.remove(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A strategy for choosing among the cards not yet shown in this pass.
pub trait SelectionPolicy {
    /// Returns an index into `candidates`. Only called with a non-empty slice.
    fn choose(&mut self, candidates: &[&CardSnapshot]) -> usize;
}

/// Earliest `next_review_at` first, ties by input position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialDue;

impl SelectionPolicy for SequentialDue {
    fn choose(&mut self, candidates: &[&CardSnapshot]) -> usize {
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(i, card)| (card.next_review_at, *i))
            .map_or(0, |(i, _)| i)
    }
}

/// Uniform choice among the candidates.
#[derive(Debug, Clone)]
pub struct Randomized<R: Rng = ThreadRng> {
    rng: R,
}

impl Randomized<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: thread_rng() }
    }
}

impl Default for Randomized<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomized<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> SelectionPolicy for Randomized<R> {
    fn choose(&mut self, candidates: &[&CardSnapshot]) -> usize {
        self.rng.gen_range(0..candidates.len())
    }
}

pub fn policy_for(strategy: SelectionStrategy) -> Box<dyn SelectionPolicy> {
    match strategy {
        SelectionStrategy::Sequential => Box::new(SequentialDue),
        SelectionStrategy::Random => Box::new(Randomized::new()),
    }
}

/// Picks the next card to show, or `None` for an empty card list.
///
/// Once every card has been shown the pass starts over: `shown` is cleared
/// and the choice is made from the full list.
pub fn select_next<'c, T: AsRef<CardSnapshot>>(
    policy: &mut dyn SelectionPolicy,
    cards: &'c [T],
    shown: &mut ShownSet,
) -> Option<&'c T> {
    if cards.is_empty() {
        return None;
    }

    let mut available: Vec<&'c T> = cards
        .iter()
        .filter(|card| !shown.contains(AsRef::<CardSnapshot>::as_ref(*card).id))
        .collect();
    if available.is_empty() {
        info!("all {} cards shown, starting a new pass", cards.len());
        shown.clear();
        available = cards.iter().collect();
    }

    let snapshots: Vec<&CardSnapshot> = available
        .iter()
        .map(|card| AsRef::<CardSnapshot>::as_ref(*card))
        .collect();
    let index = policy.choose(&snapshots).min(available.len() - 1);
    Some(available[index])
}

/// Records that a card is on screen so it is not picked again this pass.
pub fn mark_shown(shown: &mut ShownSet, id: CardId) {
    shown.insert(id);
}
