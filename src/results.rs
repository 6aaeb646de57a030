//! Session-level results aggregation
//!
//! This module collects the per-question outcomes produced by the scoring
//! engine and combines them into the final session leaderboard. The final
//! aggregation is computed once and cached, so the owner-facing and
//! player-facing reads always return identical data for the same session.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{player::Roster, scoring::QuestionOutcome};

/// The player-visible outcome of one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// The question's identifier within the session's snapshot
    pub question_id: u64,
    /// Names of players who answered fully correctly, alphabetical
    pub players_correct: Vec<String>,
    /// Mean time-to-answer in seconds over all submitters (0 when none)
    pub average_answer_time: f64,
    /// Share of joined players who answered fully correctly, 0 to 100
    pub percent_correct: u8,
}

/// One row of the final leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUser {
    /// The player's display name
    pub name: String,
    /// The player's total score across all scored questions
    pub score: f64,
}

/// The session-level aggregation served once FINAL_RESULTS is reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResults {
    /// Players by descending total score; equal totals keep join order
    pub users_ranked_by_score: Vec<RankedUser>,
    /// One entry per scored question, in question order
    pub question_results: Vec<QuestionResult>,
}

/// Serialization helper for Results
#[derive(Deserialize)]
struct ResultsSerde {
    outcomes: Vec<QuestionOutcome>,
}

/// Question outcomes in question order, plus the cached final aggregation
///
/// Outcomes are appended strictly in question order as questions close, so
/// the outcome at index `i` belongs to the question at position `i`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "ResultsSerde")]
pub struct Results {
    /// One outcome per closed question, in question order
    outcomes: Vec<QuestionOutcome>,
    /// Final aggregation, computed once (rebuilt on demand after deserialization)
    #[serde(skip)]
    final_results: once_cell_serde::sync::OnceCell<FinalResults>,
}

impl From<ResultsSerde> for Results {
    /// Reconstructs Results from serialized data
    ///
    /// The cached final aggregation is not serialized; it is recomputed on
    /// the next read, which yields identical data since aggregation is pure.
    fn from(serde: ResultsSerde) -> Self {
        Self {
            outcomes: serde.outcomes,
            final_results: once_cell_serde::sync::OnceCell::new(),
        }
    }
}

impl Results {
    /// Appends the outcome of the question that just closed
    pub fn push(&mut self, outcome: QuestionOutcome) {
        self.outcomes.push(outcome);
    }

    /// Whether the question at this position has been scored
    pub fn has_result(&self, position: usize) -> bool {
        position < self.outcomes.len()
    }

    /// The frozen result for a question, if it has been computed
    pub fn result(&self, position: usize) -> Option<&QuestionResult> {
        self.outcomes.get(position).map(|outcome| &outcome.result)
    }

    /// The number of scored questions
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no question has been scored yet
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// The final leaderboard and ordered question results
    ///
    /// Computed from the scored outcomes on first call and cached; every
    /// later call returns the same aggregation regardless of caller. Every
    /// joined player appears in the leaderboard, scoreless players included.
    pub fn final_results(&self, roster: &Roster) -> &FinalResults {
        self.final_results.get_or_init(|| {
            let mut totals: Vec<f64> = vec![0.0; roster.len()];
            for outcome in &self.outcomes {
                for (id, points) in &outcome.awards {
                    if let Some(join_index) = roster.join_index(*id) {
                        totals[join_index] += points;
                    }
                }
            }

            let users_ranked_by_score = roster
                .iter()
                .zip(totals)
                .map(|((_, name), score)| RankedUser {
                    name: name.to_owned(),
                    score,
                })
                // stable sort over join order, so equal totals keep it
                .sorted_by(|a, b| b.score.total_cmp(&a.score))
                .collect_vec();

            FinalResults {
                users_ranked_by_score,
                question_results: self
                    .outcomes
                    .iter()
                    .map(|outcome| outcome.result.clone())
                    .collect_vec(),
            }
        })
    }
}
