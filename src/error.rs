//! Crate-wide error taxonomy
//!
//! Every fallible engine operation reports a synchronous, caller-visible
//! [`Error`]. Each error maps onto one of four [`ErrorKind`] classes so an
//! embedding can translate failures uniformly (for example into HTTP status
//! codes) without matching on individual variants.

use thiserror::Error;

use super::{
    ledger::SelectionError,
    player,
    session::{Action, Phase},
};

/// The four classes every engine error falls into
///
/// There are no transient failures in this engine (it is pure in-memory
/// logic), so there is no "retryable" class; every failure is final for the
/// single operation that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, serde::Serialize)]
pub enum ErrorKind {
    /// The caller is not the owner of the targeted session
    Authorization,
    /// The targeted session or player does not exist
    NotFound,
    /// The operation is legal in general but not in the current phase
    InvalidState,
    /// The input itself is malformed or out of range
    Validation,
}

/// Errors reported by the session engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No session exists with the given id
    #[error("session not found")]
    SessionNotFound,
    /// No player with the given id has joined the session
    #[error("player not found")]
    PlayerNotFound,
    /// The caller is not the owner of the session
    #[error("caller does not own this session")]
    Unauthorized,
    /// A session cannot be created from a quiz with no questions
    #[error("quiz snapshot contains no questions")]
    EmptyQuiz,
    /// The requested auto-start threshold is out of range
    #[error(
        "auto-start threshold {0} is outside of [{min}, {max}]",
        min = crate::constants::session::MIN_AUTO_START,
        max = crate::constants::session::MAX_AUTO_START,
    )]
    AutoStartOutOfRange(usize),
    /// The quiz already has the maximum number of non-ended sessions
    #[error("quiz already has the maximum number of active sessions")]
    TooManyActiveSessions,
    /// The action token does not name any manual action
    #[error("unrecognized action {0:?}")]
    UnknownAction(String),
    /// The action is not legal from the session's current phase
    #[error("action {action} is not allowed in phase {phase}")]
    IllegalTransition {
        /// The requested manual action
        action: Action,
        /// The phase the session was in when the action arrived
        phase: Phase,
    },
    /// NEXT_QUESTION was requested but the current question is the last one
    #[error("no questions remain after the current one")]
    NoRemainingQuestions,
    /// A join was attempted after the session left the lobby
    #[error("session is no longer accepting players")]
    JoinClosed,
    /// A submission targeted a question other than the current one
    #[error("question {0} is not the current question")]
    WrongQuestion(usize),
    /// A submission arrived while the current question is not open
    #[error("answers are not being accepted right now")]
    SubmissionsClosed,
    /// A result was requested for a question position outside the quiz
    #[error("question {0} does not exist")]
    QuestionOutOfRange(usize),
    /// A result was requested before the question left its open phase
    #[error("results for question {0} are not available yet")]
    ResultUnavailable(usize),
    /// Final results were requested before FINAL_RESULTS was reached
    #[error("final results are not available yet")]
    FinalResultsUnavailable,
    /// Joining the roster failed (full session or rejected name)
    #[error(transparent)]
    Join(#[from] player::Error),
    /// The submitted answer selection is malformed
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

impl Error {
    /// The taxonomy class this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Authorization,
            Self::SessionNotFound | Self::PlayerNotFound => ErrorKind::NotFound,
            Self::IllegalTransition { .. }
            | Self::NoRemainingQuestions
            | Self::JoinClosed
            | Self::WrongQuestion(_)
            | Self::SubmissionsClosed
            | Self::ResultUnavailable(_)
            | Self::FinalResultsUnavailable => ErrorKind::InvalidState,
            Self::EmptyQuiz
            | Self::AutoStartOutOfRange(_)
            | Self::TooManyActiveSessions
            | Self::UnknownAction(_)
            | Self::QuestionOutOfRange(_)
            | Self::Join(_)
            | Self::Selection(_) => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::Unauthorized.kind(), ErrorKind::Authorization);
        assert_eq!(Error::SessionNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(Error::PlayerNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(Error::JoinClosed.kind(), ErrorKind::InvalidState);
        assert_eq!(Error::SubmissionsClosed.kind(), ErrorKind::InvalidState);
        assert_eq!(Error::FinalResultsUnavailable.kind(), ErrorKind::InvalidState);
        assert_eq!(Error::EmptyQuiz.kind(), ErrorKind::Validation);
        assert_eq!(Error::AutoStartOutOfRange(51).kind(), ErrorKind::Validation);
        assert_eq!(
            Error::UnknownAction("SHUFFLE".to_string()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_nested_errors_are_validation() {
        let join: Error = player::Error::Name(names::Error::Used).into();
        assert_eq!(join.kind(), ErrorKind::Validation);

        let selection: Error = SelectionError::Empty.into();
        assert_eq!(selection.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_illegal_transition_message_names_action_and_phase() {
        let error = Error::IllegalTransition {
            action: Action::SkipCountdown,
            phase: Phase::Lobby,
        };
        assert_eq!(error.kind(), ErrorKind::InvalidState);
        assert_eq!(
            error.to_string(),
            "action SKIP_COUNTDOWN is not allowed in phase LOBBY"
        );
    }

    #[test]
    fn test_threshold_message_carries_bounds() {
        let error = Error::AutoStartOutOfRange(51);
        assert_eq!(error.to_string(), "auto-start threshold 51 is outside of [0, 50]");
    }
}
