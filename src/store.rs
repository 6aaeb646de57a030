//! The session store: keyed lifecycle for independent sessions
//!
//! [`SessionStore`] owns every live [`Session`], keyed by session id. It is
//! the engine's outward face: creation (with the per-quiz quota and
//! threshold checks), owner authorization on owner-facing calls, routing of
//! delivered alarms, and the full-store clear. Sessions are independent;
//! nothing here couples one session's timeline to another's.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use super::{
    constants,
    error::Error,
    names::NameStyle,
    player,
    quiz::{AnswerId, QuizSnapshot},
    results::{FinalResults, QuestionResult},
    session::{Action, OwnerId, Session, SessionStatus},
    session_id::SessionId,
    timer::AlarmMessage,
};

/// All live sessions, keyed by session id
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionStore {
    /// The sessions themselves
    sessions: HashMap<SessionId, Session>,
    /// Style used for generated player names in every session
    name_style: NameStyle,
}

impl SessionStore {
    /// Creates a store generating player names in the given style
    pub fn new(name_style: NameStyle) -> Self {
        Self {
            sessions: HashMap::new(),
            name_style,
        }
    }

    /// Creates a session from an immutable quiz snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuiz`] for a snapshot without questions,
    /// [`Error::AutoStartOutOfRange`] for a threshold above the cap, or
    /// [`Error::TooManyActiveSessions`] when the quiz already has the
    /// maximum number of non-ended sessions.
    pub fn create_session(
        &mut self,
        quiz: QuizSnapshot,
        auto_start_threshold: usize,
        owner: OwnerId,
    ) -> Result<SessionId, Error> {
        if quiz.is_empty() {
            return Err(Error::EmptyQuiz);
        }
        if auto_start_threshold > constants::session::MAX_AUTO_START {
            return Err(Error::AutoStartOutOfRange(auto_start_threshold));
        }
        let active = self
            .sessions
            .values()
            .filter(|session| session.quiz_id() == quiz.quiz_id && !session.is_ended())
            .count();
        if active >= constants::session::MAX_ACTIVE_SESSIONS_PER_QUIZ {
            return Err(Error::TooManyActiveSessions);
        }

        let id = loop {
            let candidate = SessionId::new();
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        tracing::debug!(session = %id, quiz = %quiz.quiz_id, "session created");
        self.sessions.insert(
            id,
            Session::new(id, owner, quiz, auto_start_threshold, self.name_style),
        );
        Ok(id)
    }

    /// A consistent snapshot of a session's state, for its owner
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] or [`Error::Unauthorized`].
    pub fn session_status(&self, id: SessionId, owner: OwnerId) -> Result<SessionStatus, Error> {
        Ok(self.owned(id, owner)?.status())
    }

    /// Applies a manual action named by its token
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] for an unrecognized token, plus the
    /// lookup, authorization, and transition errors of the session itself.
    pub fn advance<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        id: SessionId,
        owner: OwnerId,
        action: &str,
        schedule: S,
    ) -> Result<(), Error> {
        let action: Action = action.parse()?;
        self.owned_mut(id, owner)?.apply(action, schedule)
    }

    /// Adds a player to a session
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] for an unknown session, plus the
    /// session's own join errors.
    pub fn join<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        id: SessionId,
        requested_name: &str,
        schedule: S,
    ) -> Result<player::Id, Error> {
        self.session_mut(id)?.join(requested_name, schedule)
    }

    /// Records a player's answer for a session's current question
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] for an unknown session, plus the
    /// session's own submission errors.
    pub fn submit_answer(
        &mut self,
        id: SessionId,
        player: player::Id,
        question_position: usize,
        answer_ids: &[AnswerId],
    ) -> Result<(), Error> {
        self.session_mut(id)?
            .submit_answer(player, question_position, answer_ids)
    }

    /// A frozen question result, for the session's owner
    ///
    /// # Errors
    ///
    /// Returns lookup/authorization errors, or the session's own result
    /// availability errors.
    pub fn question_result(
        &self,
        id: SessionId,
        owner: OwnerId,
        question_position: usize,
    ) -> Result<&QuestionResult, Error> {
        self.owned(id, owner)?.question_result(question_position)
    }

    /// A frozen question result, for a joined player
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerNotFound`] when the player has not joined the
    /// session, or the session's own result availability errors.
    pub fn player_question_result(
        &self,
        id: SessionId,
        player: player::Id,
        question_position: usize,
    ) -> Result<&QuestionResult, Error> {
        let session = self.session(id)?;
        if !session.contains_player(player) {
            return Err(Error::PlayerNotFound);
        }
        session.question_result(question_position)
    }

    /// The final results, for the session's owner
    ///
    /// # Errors
    ///
    /// Returns lookup/authorization errors, or
    /// [`Error::FinalResultsUnavailable`] before FINAL_RESULTS is reached.
    pub fn final_results(&self, id: SessionId, owner: OwnerId) -> Result<&FinalResults, Error> {
        self.owned(id, owner)?.final_results()
    }

    /// The final results, for a joined player
    ///
    /// Returns exactly the same aggregation as the owner-facing read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerNotFound`] when the player has not joined the
    /// session, or [`Error::FinalResultsUnavailable`] before FINAL_RESULTS.
    pub fn player_final_results(
        &self,
        id: SessionId,
        player: player::Id,
    ) -> Result<&FinalResults, Error> {
        let session = self.session(id)?;
        if !session.contains_player(player) {
            return Err(Error::PlayerNotFound);
        }
        session.final_results()
    }

    /// Delivers an expired alarm to the session it belongs to
    ///
    /// Alarms for unknown sessions (cleared since scheduling) are dropped.
    pub fn handle_alarm<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: &AlarmMessage,
        schedule: S,
    ) {
        match self.sessions.get_mut(&message.session_id) {
            Some(session) => session.receive_alarm(message, schedule),
            None => {
                tracing::trace!(session = %message.session_id, "alarm for unknown session dropped");
            }
        }
    }

    /// Removes every session
    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    /// The number of sessions in the store, ended ones included
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn session(&self, id: SessionId) -> Result<&Session, Error> {
        self.sessions.get(&id).ok_or(Error::SessionNotFound)
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, Error> {
        self.sessions.get_mut(&id).ok_or(Error::SessionNotFound)
    }

    fn owned(&self, id: SessionId, owner: OwnerId) -> Result<&Session, Error> {
        let session = self.session(id)?;
        if session.owner() != owner {
            return Err(Error::Unauthorized);
        }
        Ok(session)
    }

    fn owned_mut(&mut self, id: SessionId, owner: OwnerId) -> Result<&mut Session, Error> {
        let session = self.session_mut(id)?;
        if session.owner() != owner {
            return Err(Error::Unauthorized);
        }
        Ok(session)
    }
}
