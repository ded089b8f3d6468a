// src/scheduler.rs
// Confidence update and next-review computation.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use thiserror::Error;

use crate::config::SchedulerConfig;
use crate::deck::CardSnapshot;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Confidence values are kept on a 1e-6 grid.
const CONFIDENCE_QUANTUM: f64 = 1e6;

/// The learner's self-reported result for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Remembered,
    Forgotten,
}

impl Outcome {
    pub fn is_remembered(self) -> bool {
        self == Outcome::Remembered
    }
}

impl From<bool> for Outcome {
    fn from(remembered: bool) -> Self {
        if remembered {
            Outcome::Remembered
        } else {
            Outcome::Forgotten
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),

    #[error("review count cannot be incremented past {}", u32::MAX)]
    ReviewCountOverflow,

    #[error("next review date is out of range")]
    IntervalOutOfRange,
}

/// Records one review outcome and returns the updated review fields.
///
/// The interval is computed from the post-update confidence and review count.
/// Out-of-range input is rejected rather than clamped.
pub fn apply_outcome(
    config: &SchedulerConfig,
    card: &CardSnapshot,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> Result<CardSnapshot, SchedulerError> {
    if !card.confidence.is_finite() || !(0.0..=1.0).contains(&card.confidence) {
        return Err(SchedulerError::InvalidConfidence(card.confidence));
    }
    let review_count = card
        .review_count
        .checked_add(1)
        .ok_or(SchedulerError::ReviewCountOverflow)?;

    let confidence = match outcome {
        Outcome::Remembered => (card.confidence + config.step).min(1.0),
        Outcome::Forgotten => (card.confidence - config.step).max(0.0),
    };
    let confidence = quantize(confidence);

    let interval = review_interval(config, confidence, review_count);
    let next_review_at = now
        .checked_add_signed(interval)
        .ok_or(SchedulerError::IntervalOutOfRange)?;
    debug!(
        "card {}: {:?}, confidence {} -> {}, next review in {}m",
        card.id,
        outcome,
        card.confidence,
        confidence,
        interval.num_minutes()
    );

    Ok(CardSnapshot {
        id: card.id,
        confidence,
        review_count,
        last_reviewed_at: Some(now),
        next_review_at,
    })
}

/// Delay until the next review for a card with the given confidence.
///
/// Below `soon_threshold` the card returns within the day (at least an hour).
/// At or above it the delay backs off as `2^review_count` days scaled by
/// `0.5 + confidence`.
pub fn review_interval(config: &SchedulerConfig, confidence: f64, review_count: u32) -> Duration {
    let ms = if confidence < config.soon_threshold {
        (24.0 * confidence).max(1.0) * MS_PER_HOUR
    } else {
        let base_days = 2f64.powf(f64::from(review_count));
        base_days * (0.5 + confidence) * MS_PER_DAY
    };

    let cap = config.max_interval_days.max(0) as f64 * MS_PER_DAY;
    let ms = ms.min(cap).min(i64::MAX as f64).round();
    Duration::milliseconds(ms as i64)
}

pub fn is_mastered(config: &SchedulerConfig, card: &CardSnapshot) -> bool {
    card.confidence >= config.mastery_threshold
}

pub fn is_due(card: &CardSnapshot, now: DateTime<Utc>) -> bool {
    card.next_review_at <= now
}

fn quantize(confidence: f64) -> f64 {
    ((confidence * CONFIDENCE_QUANTUM).round() / CONFIDENCE_QUANTUM).clamp(0.0, 1.0)
}
