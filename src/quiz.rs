//! Quiz snapshots and question content
//!
//! A session never reads live authoring data: it captures an immutable
//! [`QuizSnapshot`] at creation time, so later edits to the authored quiz
//! cannot alter an in-flight or historical session. The snapshot assigns
//! stable per-session answer identifiers and display colours.

use std::{collections::BTreeSet, fmt::Display, str::FromStr, time::Duration};

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

/// A unique identifier for an authored quiz
///
/// The authoring system is an external collaborator; the engine only keeps
/// this opaque id to enforce the per-quiz active-session quota.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct QuizId(Uuid);

impl QuizId {
    /// Creates a new random quiz ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuizId {
    /// Creates a new random quiz ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for QuizId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for QuizId {
    type Err = uuid::Error;

    /// Parses a quiz ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A stable per-session identifier for one answer option
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnswerId(u64);

impl Display for AnswerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Display colour assigned to an answer option
///
/// Colours are assigned cyclically from a fixed palette at snapshot time so
/// clients can render stable answer buttons for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    /// Red
    Red,
    /// Blue
    Blue,
    /// Green
    Green,
    /// Yellow
    Yellow,
    /// Purple
    Purple,
    /// Brown
    Brown,
    /// Orange
    Orange,
}

impl Colour {
    const PALETTE: [Colour; 7] = [
        Colour::Red,
        Colour::Blue,
        Colour::Green,
        Colour::Yellow,
        Colour::Purple,
        Colour::Brown,
        Colour::Orange,
    ];

    /// Picks the palette colour for the answer at the given position
    pub fn cycle(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

/// Authoring-side input for one answer option, before snapshotting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerDraft {
    /// The answer's display text
    pub text: String,
    /// Whether this answer belongs to the question's correct set
    pub correct: bool,
}

/// Authoring-side input for one question, before snapshotting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    /// The question text shown to players
    pub text: String,
    /// How long the question stays open for answers (fractional seconds supported)
    pub duration: Duration,
    /// Points awarded to the fastest fully correct player
    pub points: f64,
    /// The answer options, in display order
    pub answers: Vec<AnswerDraft>,
}

/// One answer option inside a question snapshot
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerOption {
    /// Stable per-session identifier for this option
    #[garde(skip)]
    pub id: AnswerId,
    /// The answer's display text
    #[garde(length(max = crate::constants::question::MAX_ANSWER_TEXT_LENGTH))]
    pub text: String,
    /// Whether this option belongs to the correct set
    #[garde(skip)]
    pub correct: bool,
    /// Display colour assigned at snapshot time
    #[garde(skip)]
    pub colour: Colour,
}

/// Validates that a question duration falls within the configured bounds
fn validate_duration(val: &Duration, _ctx: &()) -> garde::Result {
    let ms = u64::try_from(val.as_millis()).unwrap_or(u64::MAX);
    if (crate::constants::question::MIN_DURATION_MS..=crate::constants::question::MAX_DURATION_MS)
        .contains(&ms)
    {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "duration {ms}ms is outside of the bounds [{},{}]",
            crate::constants::question::MIN_DURATION_MS,
            crate::constants::question::MAX_DURATION_MS,
        )))
    }
}

/// Validates that a question has at least one correct answer option
fn validate_has_correct(answers: &[AnswerOption], _ctx: &()) -> garde::Result {
    if answers.iter().any(|a| a.correct) {
        Ok(())
    } else {
        Err(garde::Error::new("question has no correct answer"))
    }
}

/// An immutable copy of one question, taken at session creation
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionSnapshot {
    /// The question's identifier (1-based position within the quiz)
    #[garde(skip)]
    pub id: u64,
    /// The question text shown to players
    #[garde(length(min = 1, max = crate::constants::question::MAX_TEXT_LENGTH))]
    pub text: String,
    /// How long the question stays open for answers
    #[garde(custom(validate_duration))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub duration: Duration,
    /// Points awarded to the fastest fully correct player
    #[garde(range(min = crate::constants::question::MIN_POINTS, max = crate::constants::question::MAX_POINTS))]
    pub points: f64,
    /// The answer options, in display order
    #[garde(
        length(min = crate::constants::question::MIN_ANSWER_COUNT, max = crate::constants::question::MAX_ANSWER_COUNT),
        custom(validate_has_correct),
        dive
    )]
    pub answers: Vec<AnswerOption>,
}

impl QuestionSnapshot {
    /// Returns the set of identifiers of this question's correct answers
    pub fn correct_answer_ids(&self) -> BTreeSet<AnswerId> {
        self.answers
            .iter()
            .filter(|a| a.correct)
            .map(|a| a.id)
            .collect()
    }

    /// Checks whether an identifier belongs to this question's answer set
    pub fn has_answer(&self, id: AnswerId) -> bool {
        self.answers.iter().any(|a| a.id == id)
    }
}

/// An immutable copy of a whole quiz, taken at session creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizSnapshot {
    /// Identifier of the authored quiz this snapshot was taken from
    #[garde(skip)]
    pub quiz_id: QuizId,
    /// The quiz title
    #[garde(length(max = crate::constants::quiz::MAX_TITLE_LENGTH))]
    pub title: String,
    /// The questions, in play order
    #[garde(length(min = 1, max = crate::constants::quiz::MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<QuestionSnapshot>,
}

impl QuizSnapshot {
    /// Captures a validated snapshot from authoring drafts
    ///
    /// Question identifiers are their 1-based position; answer identifiers
    /// are assigned sequentially across the whole snapshot and colours are
    /// cycled through the palette, so both are stable for the session's
    /// lifetime.
    ///
    /// # Errors
    ///
    /// Returns the validation report if the drafts violate any content
    /// bounds (empty quiz, out-of-range duration or points, missing correct
    /// answer, over-long texts).
    pub fn capture(
        quiz_id: QuizId,
        title: impl Into<String>,
        questions: Vec<QuestionDraft>,
    ) -> Result<Self, garde::Report> {
        let mut next_answer_id = 0u64;
        let questions = questions
            .into_iter()
            .enumerate()
            .map(|(question_index, draft)| QuestionSnapshot {
                id: question_index as u64 + 1,
                text: draft.text,
                duration: draft.duration,
                points: draft.points,
                answers: draft
                    .answers
                    .into_iter()
                    .enumerate()
                    .map(|(answer_index, answer)| {
                        next_answer_id += 1;
                        AnswerOption {
                            id: AnswerId(next_answer_id),
                            text: answer.text,
                            correct: answer.correct,
                            colour: Colour::cycle(answer_index),
                        }
                    })
                    .collect(),
            })
            .collect();

        let snapshot = Self {
            quiz_id,
            title: title.into(),
            questions,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Returns the number of questions in this snapshot
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Checks whether this snapshot contains any questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(correct: &[bool]) -> QuestionDraft {
        QuestionDraft {
            text: "What sound does a duck make?".to_string(),
            duration: Duration::from_secs(30),
            points: 5.0,
            answers: correct
                .iter()
                .enumerate()
                .map(|(i, &correct)| AnswerDraft {
                    text: format!("option {i}"),
                    correct,
                })
                .collect(),
        }
    }

    #[test]
    fn test_capture_assigns_stable_ids_and_colours() {
        let snapshot = QuizSnapshot::capture(
            QuizId::new(),
            "Animals",
            vec![draft(&[true, false]), draft(&[false, true, false])],
        )
        .unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.questions[0].id, 1);
        assert_eq!(snapshot.questions[1].id, 2);

        // answer ids are sequential across the whole snapshot
        let ids: Vec<AnswerId> = snapshot
            .questions
            .iter()
            .flat_map(|q| q.answers.iter().map(|a| a.id))
            .collect();
        assert_eq!(ids, (1..=5).map(AnswerId).collect::<Vec<_>>());

        // colours cycle per question
        assert_eq!(snapshot.questions[0].answers[0].colour, Colour::Red);
        assert_eq!(snapshot.questions[0].answers[1].colour, Colour::Blue);
        assert_eq!(snapshot.questions[1].answers[2].colour, Colour::Green);
    }

    #[test]
    fn test_capture_rejects_empty_quiz() {
        assert!(QuizSnapshot::capture(QuizId::new(), "Empty", vec![]).is_err());
    }

    #[test]
    fn test_capture_rejects_question_without_correct_answer() {
        let result = QuizSnapshot::capture(QuizId::new(), "Bad", vec![draft(&[false, false])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_capture_rejects_single_answer_question() {
        let result = QuizSnapshot::capture(QuizId::new(), "Bad", vec![draft(&[true])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_capture_rejects_out_of_bounds_duration() {
        let mut d = draft(&[true, false]);
        d.duration = Duration::from_millis(10);
        assert!(QuizSnapshot::capture(QuizId::new(), "Fast", vec![d]).is_err());

        let mut d = draft(&[true, false]);
        d.duration = Duration::from_secs(500);
        assert!(QuizSnapshot::capture(QuizId::new(), "Slow", vec![d]).is_err());
    }

    #[test]
    fn test_capture_accepts_fractional_duration() {
        let mut d = draft(&[true, false]);
        d.duration = Duration::from_millis(1500);
        assert!(QuizSnapshot::capture(QuizId::new(), "Quick", vec![d]).is_ok());
    }

    #[test]
    fn test_correct_answer_ids() {
        let snapshot =
            QuizSnapshot::capture(QuizId::new(), "Q", vec![draft(&[true, false, true])]).unwrap();
        let question = &snapshot.questions[0];
        let correct = question.correct_answer_ids();
        assert_eq!(correct.len(), 2);
        assert!(correct.contains(&question.answers[0].id));
        assert!(correct.contains(&question.answers[2].id));
        assert!(question.has_answer(question.answers[1].id));
        assert!(!question.has_answer(AnswerId(999)));
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let snapshot =
            QuizSnapshot::capture(QuizId::new(), "Animals", vec![draft(&[true, false])]).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: QuizSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.questions[0].duration, Duration::from_secs(30));
        assert_eq!(restored.questions[0].answers[0].id, AnswerId(1));
    }
}
