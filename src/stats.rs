// src/stats.rs
// Dashboard numbers: card totals and the daily study streak.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::deck::CardSnapshot;
use crate::scheduler::is_mastered;

/// Consecutive calendar days (UTC) with at least one review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStreak {
    pub days: u32,
    pub last_study_date: Option<NaiveDate>,
}

impl DayStreak {
    pub fn record_study(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        self.days = match self.last_study_date {
            Some(last) if last == today => self.days,
            Some(last) if last.succ_opt() == Some(today) => self.days.saturating_add(1),
            // A clock that went backwards keeps the streak as it is.
            Some(last) if last > today => return,
            _ => 1,
        };
        self.last_study_date = Some(today);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub total_cards: usize,
    pub mastered_cards: usize,
    pub remaining_cards: usize,
    pub streak_days: u32,
    pub last_study_date: Option<NaiveDate>,
}

impl StudyStats {
    pub fn from_cards<T: AsRef<CardSnapshot>>(
        config: &SchedulerConfig,
        cards: &[T],
        streak: &DayStreak,
    ) -> Self {
        let total_cards = cards.len();
        let mastered_cards = cards
            .iter()
            .filter(|card| is_mastered(config, AsRef::<CardSnapshot>::as_ref(*card)))
            .count();
        Self {
            total_cards,
            mastered_cards,
            remaining_cards: total_cards - mastered_cards,
            streak_days: streak.days,
            last_study_date: streak.last_study_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::CardId;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 27, 18, 30, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let mut streak = DayStreak::default();
        streak.record_study(day(0));
        assert_eq!(streak.days, 1);

        streak.record_study(day(0) + Duration::hours(2));
        assert_eq!(streak.days, 1);

        // Crosses Feb 29 in a leap year.
        streak.record_study(day(1));
        streak.record_study(day(2));
        assert_eq!(streak.days, 3);
        assert_eq!(streak.last_study_date, Some(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[test]
    fn test_gap_restarts_streak() {
        let mut streak = DayStreak::default();
        streak.record_study(day(0));
        streak.record_study(day(1));
        streak.record_study(day(4));
        assert_eq!(streak.days, 1);
    }

    #[test]
    fn test_clock_going_backwards_is_ignored() {
        let mut streak = DayStreak::default();
        streak.record_study(day(3));
        streak.record_study(day(1));
        assert_eq!(streak.days, 1);
        assert_eq!(streak.last_study_date, Some(day(3).date_naive()));
    }

    #[test]
    fn test_stats_count_mastered_cards() {
        let config = SchedulerConfig::default();
        let cards: Vec<CardSnapshot> = [0.0, 0.4, 0.8, 1.0]
            .iter()
            .map(|&confidence| CardSnapshot {
                confidence,
                ..CardSnapshot::unreviewed(CardId::new(), day(0))
            })
            .collect();
        let streak = DayStreak { days: 4, last_study_date: Some(day(0).date_naive()) };

        let stats = StudyStats::from_cards(&config, &cards, &streak);
        assert_eq!(stats.total_cards, 4);
        assert_eq!(stats.mastered_cards, 2);
        assert_eq!(stats.remaining_cards, 2);
        assert_eq!(stats.streak_days, 4);
    }

    #[test]
    fn test_stats_for_empty_store() {
        let cards: Vec<CardSnapshot> = Vec::new();
        let config = SchedulerConfig::default();
        let stats = StudyStats::from_cards(&config, &cards, &DayStreak::default());
        assert_eq!(stats, StudyStats::default());
    }
}
