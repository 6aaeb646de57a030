//! Pure scoring for a single question
//!
//! [`score_question`] turns a frozen [`AnswerLedger`] plus the question's
//! snapshot and the session roster into a [`QuestionOutcome`]. It has no
//! access to a clock and no side effects, so scoring the same frozen ledger
//! twice yields identical output; the session invokes it exactly once per
//! question, when the question leaves its open phase.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{
    ledger::AnswerLedger,
    player::{self, Roster},
    quiz::QuestionSnapshot,
    results::QuestionResult,
};

/// Everything scoring one question produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// The player-visible question result
    pub result: QuestionResult,
    /// Points awarded to each fully correct player; everyone else gets 0
    pub awards: Vec<(player::Id, f64)>,
}

/// Scores one question from its frozen ledger
///
/// A submission is fully correct only when its selected set equals the
/// question's correct set exactly. Fully correct players are ranked by
/// ascending submission timestamp (ties broken by join order, earlier joiner
/// first) and the player at rank `r` is awarded `points / r`. The percentage
/// is taken over all joined players and rounded to the nearest whole number;
/// the average answer time covers every submitter, correct or not.
pub fn score_question(
    question: &QuestionSnapshot,
    roster: &Roster,
    ledger: &AnswerLedger,
) -> QuestionOutcome {
    let correct_set = question.correct_answer_ids();

    let fully_correct = roster
        .iter()
        .enumerate()
        .filter_map(|(join_index, (id, name))| {
            let entry = ledger.entry(id)?;
            (entry.selected == correct_set).then_some((id, name, entry.submitted_at, join_index))
        })
        .collect_vec();

    let awards = fully_correct
        .iter()
        .sorted_by_key(|(_, _, submitted_at, join_index)| (*submitted_at, *join_index))
        .enumerate()
        .map(|(position, (id, _, _, _))| (*id, question.points / (position as f64 + 1.0)))
        .collect_vec();

    let players_correct = fully_correct
        .iter()
        .map(|(_, name, _, _)| (*name).to_owned())
        .sorted()
        .collect_vec();

    let percent_correct = if roster.is_empty() {
        0
    } else {
        (100.0 * fully_correct.len() as f64 / roster.len() as f64).round() as u8
    };

    QuestionOutcome {
        result: QuestionResult {
            question_id: question.id,
            players_correct,
            average_answer_time: ledger.average_answer_time(),
            percent_correct,
        },
        awards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        names::NameStyle,
        quiz::{AnswerDraft, AnswerId, QuestionDraft, QuizId, QuizSnapshot},
    };
    use std::time::Duration;
    use web_time::SystemTime;

    fn five_point_question() -> QuestionSnapshot {
        let snapshot = QuizSnapshot::capture(
            QuizId::new(),
            "Scoring",
            vec![QuestionDraft {
                text: "Which letter?".to_string(),
                duration: Duration::from_secs(30),
                points: 5.0,
                answers: vec![
                    AnswerDraft {
                        text: "Y".to_string(),
                        correct: true,
                    },
                    AnswerDraft {
                        text: "N".to_string(),
                        correct: false,
                    },
                ],
            }],
        )
        .unwrap();
        snapshot.questions[0].clone()
    }

    fn roster_of(names: &[&str]) -> (Roster, Vec<player::Id>) {
        let mut roster = Roster::default();
        let ids = names
            .iter()
            .map(|name| roster.join(name, NameStyle::default()).unwrap())
            .collect();
        (roster, ids)
    }

    #[test]
    fn test_awards_divide_points_by_speed_rank() {
        let question = five_point_question();
        let yes = question.answers[0].id;
        let no = question.answers[1].id;
        let (roster, ids) = roster_of(&["A", "BB", "CCC", "DDDD"]);
        let opened = SystemTime::UNIX_EPOCH;

        let mut ledger = AnswerLedger::default();
        ledger.open(opened);
        ledger.record(ids[0], &question, &[yes], opened).unwrap();
        ledger
            .record(ids[1], &question, &[no], opened + Duration::from_millis(500))
            .unwrap();
        ledger
            .record(ids[2], &question, &[no], opened + Duration::from_millis(900))
            .unwrap();
        ledger
            .record(
                ids[3],
                &question,
                &[yes],
                opened + Duration::from_millis(1100),
            )
            .unwrap();

        let outcome = score_question(&question, &roster, &ledger);

        assert_eq!(outcome.awards, vec![(ids[0], 5.0), (ids[3], 2.5)]);
        assert_eq!(outcome.result.players_correct, vec!["A", "DDDD"]);
        assert_eq!(outcome.result.percent_correct, 50);
        assert!((outcome.result.average_answer_time - 0.625).abs() < 1e-9);
    }

    #[test]
    fn test_partial_overlap_is_not_correct() {
        let snapshot = QuizSnapshot::capture(
            QuizId::new(),
            "Multi",
            vec![QuestionDraft {
                text: "Pick all three".to_string(),
                duration: Duration::from_secs(30),
                points: 10.0,
                answers: vec![
                    AnswerDraft {
                        text: "a".to_string(),
                        correct: true,
                    },
                    AnswerDraft {
                        text: "b".to_string(),
                        correct: true,
                    },
                    AnswerDraft {
                        text: "c".to_string(),
                        correct: true,
                    },
                    AnswerDraft {
                        text: "d".to_string(),
                        correct: false,
                    },
                ],
            }],
        )
        .unwrap();
        let question = snapshot.questions[0].clone();
        let ids: Vec<AnswerId> = question.answers.iter().map(|a| a.id).collect();
        let (roster, players) = roster_of(&["A", "BB", "CCC"]);
        let opened = SystemTime::UNIX_EPOCH;

        let mut ledger = AnswerLedger::default();
        ledger.open(opened);
        // subset, superset, and disjoint selections all miss the exact set
        ledger
            .record(players[0], &question, &[ids[0], ids[1]], opened)
            .unwrap();
        ledger
            .record(
                players[1],
                &question,
                &[ids[0], ids[1], ids[2], ids[3]],
                opened + Duration::from_millis(200),
            )
            .unwrap();
        ledger
            .record(
                players[2],
                &question,
                &[ids[3]],
                opened + Duration::from_millis(400),
            )
            .unwrap();

        let outcome = score_question(&question, &roster, &ledger);

        assert!(outcome.awards.is_empty());
        assert!(outcome.result.players_correct.is_empty());
        assert_eq!(outcome.result.percent_correct, 0);
        // everyone still counts toward the average answer time
        assert!((outcome.result.average_answer_time - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_simultaneous_timestamps_break_ties_by_join_order() {
        let question = five_point_question();
        let yes = question.answers[0].id;
        let (roster, ids) = roster_of(&["Late", "Early"]);
        let opened = SystemTime::UNIX_EPOCH;
        let instant = opened + Duration::from_millis(700);

        let mut ledger = AnswerLedger::default();
        ledger.open(opened);
        // recorded in reverse join order at the exact same timestamp
        ledger.record(ids[1], &question, &[yes], instant).unwrap();
        ledger.record(ids[0], &question, &[yes], instant).unwrap();

        let outcome = score_question(&question, &roster, &ledger);

        assert_eq!(outcome.awards, vec![(ids[0], 5.0), (ids[1], 2.5)]);
    }

    #[test]
    fn test_correct_list_is_alphabetical_not_rank_order() {
        let question = five_point_question();
        let yes = question.answers[0].id;
        let (roster, ids) = roster_of(&["Zoe", "Amy"]);
        let opened = SystemTime::UNIX_EPOCH;

        let mut ledger = AnswerLedger::default();
        ledger.open(opened);
        ledger.record(ids[0], &question, &[yes], opened).unwrap();
        ledger
            .record(ids[1], &question, &[yes], opened + Duration::from_secs(1))
            .unwrap();

        let outcome = score_question(&question, &roster, &ledger);

        // Zoe was faster, but the list is alphabetical
        assert_eq!(outcome.result.players_correct, vec!["Amy", "Zoe"]);
        assert_eq!(outcome.awards[0].0, ids[0]);
    }

    #[test]
    fn test_empty_roster_scores_to_zero() {
        let question = five_point_question();
        let roster = Roster::default();
        let ledger = AnswerLedger::default();

        let outcome = score_question(&question, &roster, &ledger);

        assert_eq!(outcome.result.percent_correct, 0);
        assert_eq!(outcome.result.average_answer_time, 0.0);
        assert!(outcome.awards.is_empty());
    }

    #[test]
    fn test_percent_rounds_to_nearest() {
        let question = five_point_question();
        let yes = question.answers[0].id;
        let (roster, ids) = roster_of(&["A", "BB", "CCC"]);
        let opened = SystemTime::UNIX_EPOCH;

        let mut ledger = AnswerLedger::default();
        ledger.open(opened);
        ledger.record(ids[0], &question, &[yes], opened).unwrap();

        let outcome = score_question(&question, &roster, &ledger);

        // 1 of 3 correct: 33.33... rounds to 33
        assert_eq!(outcome.result.percent_correct, 33);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let question = five_point_question();
        let yes = question.answers[0].id;
        let (roster, ids) = roster_of(&["A", "BB"]);
        let opened = SystemTime::UNIX_EPOCH;

        let mut ledger = AnswerLedger::default();
        ledger.open(opened);
        ledger
            .record(ids[0], &question, &[yes], opened + Duration::from_millis(50))
            .unwrap();

        let first = score_question(&question, &roster, &ledger);
        let second = score_question(&question, &roster, &ledger);
        assert_eq!(first, second);
    }
}
