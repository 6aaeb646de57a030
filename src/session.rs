//! The session aggregate: phase machine, joins, submissions, and reads
//!
//! A [`Session`] owns everything belonging to one running quiz instance: the
//! current [`Phase`], the join-ordered roster, one answer ledger per
//! question, the armed timer, and the computed results. All state mutation
//! flows through its `&mut self` entry points, so the embedding serializes
//! the two trigger paths (manual actions and alarm deliveries) simply by
//! owning the session exclusively while calling in.
//!
//! Autonomous transitions never sleep inside the engine: entering a timed
//! phase hands an [`AlarmMessage`] and a delay to the caller-supplied
//! scheduler closure, and the expiry comes back through
//! [`Session::receive_alarm`]. Manual transitions cancel the armed timer
//! before touching the phase, so a stale alarm delivered later is rejected
//! by its token and swallowed as a no-op.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;
use web_time::{Duration, SystemTime};

use super::{
    constants,
    error::Error,
    ledger::AnswerLedger,
    names::NameStyle,
    player::{self, Roster},
    quiz::{AnswerId, QuizId, QuizSnapshot},
    results::{FinalResults, QuestionResult, Results},
    scoring,
    session_id::SessionId,
    timer::{AlarmKind, AlarmMessage, Timer},
};

/// Opaque identity of a session's owner
///
/// Resolving an owner credential to this identity is the job of the external
/// auth layer; the engine only compares it on owner-facing calls.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Creates a new random owner ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    /// Creates a new random owner ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OwnerId {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OwnerId {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The session's position in its fixed lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Waiting for players to join
    #[display("LOBBY")]
    Lobby,
    /// Fixed 3-second countdown before the question opens
    #[display("QUESTION_COUNTDOWN")]
    QuestionCountdown,
    /// The current question is open for answers
    #[display("QUESTION_OPEN")]
    QuestionOpen,
    /// The answering window is over; the answer is not yet revealed
    #[display("QUESTION_CLOSE")]
    QuestionClose,
    /// The correct answer is being shown
    #[display("ANSWER_SHOW")]
    AnswerShow,
    /// The session leaderboard is being shown
    #[display("FINAL_RESULTS")]
    FinalResults,
    /// Terminal; no transition leaves this phase
    #[display("END")]
    End,
}

/// A manual transition requested by the session owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Advance to the next question's countdown
    #[display("NEXT_QUESTION")]
    NextQuestion,
    /// Cut the countdown short and open the question now
    #[display("SKIP_COUNTDOWN")]
    SkipCountdown,
    /// Reveal the answer, closing the question first if still open
    #[display("GO_TO_ANSWER")]
    GoToAnswer,
    /// Show the session leaderboard
    #[display("GO_TO_FINAL_RESULTS")]
    GoToFinalResults,
    /// Terminate the session
    #[display("END")]
    End,
}

impl FromStr for Action {
    type Err = Error;

    /// Parses a manual action token
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] for any unrecognized token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEXT_QUESTION" => Ok(Self::NextQuestion),
            "SKIP_COUNTDOWN" => Ok(Self::SkipCountdown),
            "GO_TO_ANSWER" => Ok(Self::GoToAnswer),
            "GO_TO_FINAL_RESULTS" => Ok(Self::GoToFinalResults),
            "END" => Ok(Self::End),
            _ => Err(Error::UnknownAction(s.to_owned())),
        }
    }
}

/// A read-only view of a session's current state
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// The current phase
    pub phase: Phase,
    /// The current question index; `None` before the first question starts
    pub current_question_index: Option<usize>,
    /// Player names in join order
    pub players: Vec<String>,
    /// The immutable quiz snapshot this session plays
    pub quiz: QuizSnapshot,
}

/// One running instance of a quiz
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    /// The session's stable identifier
    id: SessionId,
    /// Identity of the owner; only they may advance the session
    owner: OwnerId,
    /// The current phase
    phase: Phase,
    /// 0-based index of the current question; only advances forward
    current_question_index: Option<usize>,
    /// Player count that triggers automatic lobby exit (0 disables)
    auto_start_threshold: usize,
    /// Immutable copy of the quiz taken at creation
    quiz: QuizSnapshot,
    /// Joined players, in join order
    roster: Roster,
    /// One ledger per question in the snapshot
    ledgers: Vec<AnswerLedger>,
    /// Scored question outcomes and the final aggregation
    results: Results,
    /// The at-most-one armed autonomous timer
    timer: Timer,
    /// Style used for generated player names
    name_style: NameStyle,
}

impl Session {
    /// Creates a session in the lobby phase
    ///
    /// The caller (the store) has already validated the snapshot and the
    /// auto-start threshold.
    pub fn new(
        id: SessionId,
        owner: OwnerId,
        quiz: QuizSnapshot,
        auto_start_threshold: usize,
        name_style: NameStyle,
    ) -> Self {
        let ledgers = (0..quiz.len()).map(|_| AnswerLedger::default()).collect();
        Self {
            id,
            owner,
            phase: Phase::Lobby,
            current_question_index: None,
            auto_start_threshold,
            quiz,
            roster: Roster::default(),
            ledgers,
            results: Results::default(),
            timer: Timer::default(),
            name_style,
        }
    }

    /// The session's identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The owner's identity
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The identifier of the quiz this session was created from
    pub fn quiz_id(&self) -> QuizId {
        self.quiz.quiz_id
    }

    /// The current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current question index, if a question has started
    pub fn current_question_index(&self) -> Option<usize> {
        self.current_question_index
    }

    /// Whether the session has reached its terminal phase
    pub fn is_ended(&self) -> bool {
        self.phase == Phase::End
    }

    /// Whether a player with this id has joined
    pub fn contains_player(&self, player: player::Id) -> bool {
        self.roster.contains(player)
    }

    /// Applies a manual action
    ///
    /// The armed timer, if any, is cancelled before the phase changes, so an
    /// expiry scheduled for the old phase can never fire into the new one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalTransition`] when the action is not legal
    /// from the current phase, or [`Error::NoRemainingQuestions`] when
    /// NEXT_QUESTION runs past the end of the snapshot.
    pub fn apply<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        action: Action,
        mut schedule: S,
    ) -> Result<(), Error> {
        match (action, self.phase) {
            (Action::NextQuestion, Phase::Lobby | Phase::QuestionClose | Phase::AnswerShow) => {
                let next = self.current_question_index.map_or(0, |index| index + 1);
                if next >= self.quiz.len() {
                    return Err(Error::NoRemainingQuestions);
                }
                self.timer.cancel();
                self.begin_countdown(next, &mut schedule);
                Ok(())
            }
            (Action::SkipCountdown, Phase::QuestionCountdown) => {
                self.timer.cancel();
                self.open_question(&mut schedule);
                Ok(())
            }
            (Action::GoToAnswer, Phase::QuestionOpen | Phase::QuestionClose) => {
                self.timer.cancel();
                self.freeze_result();
                self.set_phase(Phase::AnswerShow);
                Ok(())
            }
            (Action::GoToFinalResults, Phase::QuestionClose | Phase::AnswerShow) => {
                self.timer.cancel();
                self.freeze_result();
                self.results.final_results(&self.roster);
                self.set_phase(Phase::FinalResults);
                Ok(())
            }
            (Action::End, phase) if phase != Phase::End => {
                self.timer.cancel();
                self.set_phase(Phase::End);
                Ok(())
            }
            (action, phase) => Err(Error::IllegalTransition { action, phase }),
        }
    }

    /// Delivers an expired alarm
    ///
    /// Alarms whose token is no longer the armed one (manually superseded,
    /// cancelled, or already fired) are swallowed as no-ops.
    pub fn receive_alarm<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: &AlarmMessage,
        mut schedule: S,
    ) {
        if !self.timer.fire(message.token) {
            tracing::trace!(session = %self.id, "stale alarm ignored");
            return;
        }
        match (message.kind, self.phase) {
            (AlarmKind::CountdownElapsed, Phase::QuestionCountdown) => {
                self.open_question(&mut schedule);
            }
            (AlarmKind::DurationElapsed, Phase::QuestionOpen) => {
                self.freeze_result();
                self.set_phase(Phase::QuestionClose);
            }
            (kind, phase) => {
                tracing::trace!(session = %self.id, ?kind, %phase, "alarm does not match phase");
            }
        }
    }

    /// Adds a player to the session
    ///
    /// Joining is only possible in the lobby. An empty requested name yields
    /// a generated one, guaranteed unique within the session. When the
    /// post-join player count equals the auto-start threshold, the join
    /// performs the NEXT_QUESTION transition, so the next join attempt fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JoinClosed`] outside the lobby, or a validation
    /// error for a full roster or rejected name.
    pub fn join<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        requested_name: &str,
        mut schedule: S,
    ) -> Result<player::Id, Error> {
        if self.phase != Phase::Lobby {
            return Err(Error::JoinClosed);
        }
        let id = self.roster.join(requested_name, self.name_style)?;
        tracing::debug!(session = %self.id, player = %id, "player joined");

        // the snapshot is non-empty, so question 0 always exists
        if self.roster.len() == self.auto_start_threshold {
            self.begin_countdown(0, &mut schedule);
        }
        Ok(id)
    }

    /// Records a player's answer for the current question
    ///
    /// A valid resubmission while the question is still open replaces the
    /// earlier entry, timestamp included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerNotFound`] for an unknown player,
    /// [`Error::WrongQuestion`] when the position is not the current
    /// question, [`Error::SubmissionsClosed`] outside the open phase, or
    /// [`Error::Selection`] for a malformed selection.
    pub fn submit_answer(
        &mut self,
        player: player::Id,
        question_position: usize,
        answer_ids: &[AnswerId],
    ) -> Result<(), Error> {
        if !self.roster.contains(player) {
            return Err(Error::PlayerNotFound);
        }
        if self.current_question_index != Some(question_position) {
            return Err(Error::WrongQuestion(question_position));
        }
        if self.phase != Phase::QuestionOpen {
            return Err(Error::SubmissionsClosed);
        }
        self.ledgers[question_position].record(
            player,
            &self.quiz.questions[question_position],
            answer_ids,
            SystemTime::now(),
        )?;
        tracing::trace!(
            session = %self.id,
            player = %player,
            question = question_position,
            "answer recorded"
        );
        Ok(())
    }

    /// A consistent snapshot of the session's current state
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            current_question_index: self.current_question_index,
            players: self.roster.player_names(),
            quiz: self.quiz.clone(),
        }
    }

    /// The frozen result of a question that has left its open phase
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestionOutOfRange`] for a position outside the
    /// snapshot, or [`Error::ResultUnavailable`] while the question has not
    /// been scored yet.
    pub fn question_result(&self, position: usize) -> Result<&QuestionResult, Error> {
        if position >= self.quiz.len() {
            return Err(Error::QuestionOutOfRange(position));
        }
        self.results
            .result(position)
            .ok_or(Error::ResultUnavailable(position))
    }

    /// The final leaderboard and ordered question results
    ///
    /// # Errors
    ///
    /// Returns [`Error::FinalResultsUnavailable`] before the session reaches
    /// FINAL_RESULTS (or END).
    pub fn final_results(&self) -> Result<&FinalResults, Error> {
        match self.phase {
            Phase::FinalResults | Phase::End => Ok(self.results.final_results(&self.roster)),
            _ => Err(Error::FinalResultsUnavailable),
        }
    }

    /// Moves to the countdown phase for the question at `index`
    fn begin_countdown<S: FnMut(AlarmMessage, Duration)>(&mut self, index: usize, schedule: &mut S) {
        self.current_question_index = Some(index);
        self.set_phase(Phase::QuestionCountdown);
        let token = self.timer.arm();
        schedule(
            AlarmMessage {
                session_id: self.id,
                token,
                kind: AlarmKind::CountdownElapsed,
            },
            constants::session::COUNTDOWN,
        );
    }

    /// Opens the current question for answers and arms its duration timer
    fn open_question<S: FnMut(AlarmMessage, Duration)>(&mut self, schedule: &mut S) {
        let Some(index) = self.current_question_index else {
            return;
        };
        self.ledgers[index].open(SystemTime::now());
        self.set_phase(Phase::QuestionOpen);
        let token = self.timer.arm();
        schedule(
            AlarmMessage {
                session_id: self.id,
                token,
                kind: AlarmKind::DurationElapsed,
            },
            self.quiz.questions[index].duration,
        );
    }

    /// Scores and freezes the current question's result, once
    fn freeze_result(&mut self) {
        let Some(index) = self.current_question_index else {
            return;
        };
        if self.results.has_result(index) {
            return;
        }
        let outcome = scoring::score_question(
            &self.quiz.questions[index],
            &self.roster,
            &self.ledgers[index],
        );
        self.results.push(outcome);
    }

    /// Changes phase, logging the transition
    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(session = %self.id, from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }
}
