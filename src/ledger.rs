//! Per-question answer ledgers
//!
//! Each question in a session owns one [`AnswerLedger`]: the record of every
//! player's latest valid submission for that question, timestamped with the
//! session's shared clock. Entries replace each other (last write wins, for
//! the selection set and the timestamp alike) while the question stays open;
//! once the question closes, the ledger is frozen and read by the scoring
//! engine.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use super::{
    player,
    quiz::{AnswerId, QuestionSnapshot},
};

/// Reasons a submitted answer selection is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// The selection contains no answer identifiers
    #[error("no answers selected")]
    Empty,
    /// The same answer identifier appears more than once
    #[error("answer {0} selected more than once")]
    Duplicate(AnswerId),
    /// An identifier does not belong to the targeted question
    #[error("answer {0} does not belong to this question")]
    Foreign(AnswerId),
}

/// One player's recorded submission for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The set of selected answer identifiers
    pub selected: BTreeSet<AnswerId>,
    /// When the submission was received
    pub submitted_at: SystemTime,
}

/// The per-question record of player submissions
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AnswerLedger {
    /// When the question opened for answers; `None` until it does
    opened_at: Option<SystemTime>,
    /// Latest valid submission per player
    entries: HashMap<player::Id, Entry>,
}

impl AnswerLedger {
    /// Marks the moment the question opened for answers
    ///
    /// Average answer times are measured from this instant.
    pub fn open(&mut self, now: SystemTime) {
        self.opened_at = Some(now);
    }

    /// When the question opened, if it has
    pub fn opened_at(&self) -> Option<SystemTime> {
        self.opened_at
    }

    /// Records or replaces a player's submission for this question
    ///
    /// The selection is validated against the question's answer set; a valid
    /// resubmission overwrites the earlier entry entirely, timestamp
    /// included.
    ///
    /// # Errors
    ///
    /// * [`SelectionError::Empty`] - no identifiers were selected
    /// * [`SelectionError::Duplicate`] - an identifier appears twice
    /// * [`SelectionError::Foreign`] - an identifier belongs to another question
    pub fn record(
        &mut self,
        player: player::Id,
        question: &QuestionSnapshot,
        answer_ids: &[AnswerId],
        now: SystemTime,
    ) -> Result<(), SelectionError> {
        if answer_ids.is_empty() {
            return Err(SelectionError::Empty);
        }
        let mut selected = BTreeSet::new();
        for &id in answer_ids {
            if !question.has_answer(id) {
                return Err(SelectionError::Foreign(id));
            }
            if !selected.insert(id) {
                return Err(SelectionError::Duplicate(id));
            }
        }
        self.entries.insert(
            player,
            Entry {
                selected,
                submitted_at: now,
            },
        );
        Ok(())
    }

    /// A player's recorded entry, if they submitted
    pub fn entry(&self, player: player::Id) -> Option<&Entry> {
        self.entries.get(&player)
    }

    /// The number of players who submitted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody submitted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean time-to-answer in seconds across all submitters
    ///
    /// Measured from the question-open instant; 0 when nobody submitted or
    /// the question never opened.
    pub fn average_answer_time(&self) -> f64 {
        let Some(opened_at) = self.opened_at else {
            return 0.0;
        };
        if self.entries.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .entries
            .values()
            .map(|entry| {
                entry
                    .submitted_at
                    .duration_since(opened_at)
                    .unwrap_or_default()
                    .as_secs_f64()
            })
            .sum();
        total / self.entries.len() as f64
    }
}
