// src/streak.rs
// Consecutive-correct counter with a one-shot celebration.

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::config::SessionConfig;
use crate::scheduler::Outcome;

/// Fired once when the streak reaches the celebration threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub streak: u32,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    target: u32,
    window: Duration,
    count: u32,
    celebrating_since: Option<DateTime<Utc>>,
}

impl MilestoneTracker {
    pub fn new(target: u32, window: Duration) -> Self {
        Self {
            target,
            window,
            count: 0,
            celebrating_since: None,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.celebration_streak, Duration::seconds(config.celebration_window_secs))
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_celebrating(&self, now: DateTime<Utc>) -> bool {
        self.celebrating_since
            .map_or(false, |since| now < since + self.window)
    }

    /// Closes an expired celebration window, resetting the counter.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(since) = self.celebrating_since {
            if now >= since + self.window {
                self.celebrating_since = None;
                self.count = 0;
            }
        }
    }

    /// Counts one outcome. Returns the milestone on the review that reaches the target.
    pub fn record(&mut self, outcome: Outcome, now: DateTime<Utc>) -> Option<Milestone> {
        self.tick(now);

        match outcome {
            Outcome::Remembered => self.count = self.count.saturating_add(1),
            Outcome::Forgotten => self.count = 0,
        }

        let reached = outcome.is_remembered() && self.count == self.target;
        if reached && self.celebrating_since.is_none() {
            info!("{} correct in a row", self.count);
            self.celebrating_since = Some(now);
            return Some(Milestone { streak: self.count, at: now });
        }
        None
    }
}

impl Default for MilestoneTracker {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn test_fires_once_at_five() {
        let mut tracker = MilestoneTracker::default();
        let fired: Vec<bool> = (0..6)
            .map(|i| tracker.record(Outcome::Remembered, t(i)).is_some())
            .collect();
        assert_eq!(fired, vec![false, false, false, false, true, false]);
        assert!(tracker.is_celebrating(t(5)));
    }

    #[test]
    fn test_miss_resets_counter() {
        let mut tracker = MilestoneTracker::default();
        for i in 0..4 {
            tracker.record(Outcome::Remembered, t(i));
        }
        tracker.record(Outcome::Forgotten, t(4));
        assert_eq!(tracker.count(), 0);
        assert!(tracker.record(Outcome::Remembered, t(5)).is_none());
    }

    #[test]
    fn test_window_end_resets_even_while_streaking() {
        let mut tracker = MilestoneTracker::default();
        for i in 0..5 {
            tracker.record(Outcome::Remembered, t(i));
        }
        // Milestone opened at t(4); more correct answers inside the window.
        tracker.record(Outcome::Remembered, t(6));
        tracker.record(Outcome::Remembered, t(8));
        assert_eq!(tracker.count(), 7);

        tracker.tick(t(9));
        assert_eq!(tracker.count(), 0);
        assert!(!tracker.is_celebrating(t(9)));
    }

    #[test]
    fn test_refires_after_reset() {
        let mut tracker = MilestoneTracker::default();
        for i in 0..5 {
            tracker.record(Outcome::Remembered, t(i));
        }
        let fired: Vec<bool> = (10..15)
            .map(|i| tracker.record(Outcome::Remembered, t(i)).is_some())
            .collect();
        assert_eq!(fired, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_no_refire_while_window_open() {
        let mut tracker = MilestoneTracker::new(2, Duration::seconds(60));
        assert!(tracker.record(Outcome::Remembered, t(0)).is_none());
        assert!(tracker.record(Outcome::Remembered, t(1)).is_some());

        tracker.record(Outcome::Forgotten, t(2));
        tracker.record(Outcome::Remembered, t(3));
        assert!(tracker.record(Outcome::Remembered, t(4)).is_none());
        assert!(tracker.is_celebrating(t(4)));
    }
}
