// src/storage/replay_log.rs
// Plain-text journal of every recorded review.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::deck::CardSnapshot;
use crate::scheduler::Outcome;

pub struct ReviewJournal {
    log_path: PathBuf,
}

impl ReviewJournal {
    /// Creates a journal writing to `log_path`, creating parent directories.
    pub fn new(log_path: &Path) -> Result<Self, std::io::Error> {
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(ReviewJournal { log_path: log_path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Appends one line for a review that has already been saved.
    pub fn log_review(
        &self,
        card: &CardSnapshot,
        outcome: Outcome,
        at: DateTime<Utc>,
    ) -> Result<(), std::io::Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        // Format: timestamp,card_id,outcome,confidence,review_count,next_review_at
        let log_entry = format!(
            "{},{},{},{},{},{}\n",
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
            card.id,
            if outcome.is_remembered() { "remembered" } else { "forgotten" },
            card.confidence,
            card.review_count,
            card.next_review_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        file.write_all(log_entry.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::CardId;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_appends_one_line_per_review() {
        let dir = tempfile::tempdir().unwrap();
        let journal = ReviewJournal::new(&dir.path().join("txn").join("reviews.log")).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let card = CardSnapshot {
            id: CardId::new(),
            confidence: 0.7,
            review_count: 1,
            last_reviewed_at: Some(at),
            next_review_at: at + Duration::hours(6),
        };

        journal.log_review(&card, Outcome::Remembered, at).unwrap();
        journal.log_review(&card, Outcome::Forgotten, at).unwrap();

        let content = fs::read_to_string(journal.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!(
                "2024-03-01T12:00:00.000Z,{},remembered,0.7,1,2024-03-01T18:00:00.000Z",
                card.id
            )
        );
        assert!(lines[1].contains(",forgotten,"));
    }
}
