//! Single-shot cancellable timer bookkeeping
//!
//! The engine owns no threads and never sleeps. Whenever a phase transition
//! arms an autonomous timer, the engine hands an [`AlarmMessage`] and a delay
//! to a scheduler closure supplied by the embedding; the embedding delivers
//! the message back after the delay. Tokens carry a generation counter, so a
//! delivered alarm whose token is no longer the armed one (because a manual
//! transition cancelled or replaced it in the meantime) is recognized as
//! stale and swallowed as a no-op.

use serde::{Deserialize, Serialize};

use super::session_id::SessionId;

/// Identifies one armed alarm among all alarms ever armed for a session
///
/// Tokens are never reused: every call to [`Timer::arm`] issues a fresh one
/// and invalidates whatever token was outstanding before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerToken(u64);

/// The transition an expired alarm performs when delivered back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmKind {
    /// The pre-question countdown elapsed: open the question for answers
    CountdownElapsed,
    /// The question's answering window elapsed: close the question
    DurationElapsed,
}

/// A delayed message the embedding delivers back to the engine on expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmMessage {
    /// The session the alarm belongs to
    pub session_id: SessionId,
    /// Token that must still be the armed one for the alarm to take effect
    pub token: TimerToken,
    /// The transition the alarm performs
    pub kind: AlarmKind,
}

/// At-most-one armed alarm for a session
///
/// Cancellation never reaches into the embedding's scheduler: a cancelled
/// alarm may still be delivered later, but its token no longer matches and
/// [`Timer::fire`] rejects it.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Timer {
    /// Monotonic counter backing token issuance
    generation: u64,
    /// The currently armed token, if any
    armed: Option<TimerToken>,
}

impl Timer {
    /// Arms the timer and returns the token the scheduled alarm must carry
    ///
    /// Any previously issued token becomes stale immediately.
    pub fn arm(&mut self) -> TimerToken {
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.armed = Some(token);
        token
    }

    /// Cancels the armed alarm, if any
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    /// Consumes a delivered alarm
    ///
    /// Returns `true` and disarms the timer when the token is the currently
    /// armed one; returns `false` for stale tokens (cancelled, replaced, or
    /// already fired), in which case the caller must treat the alarm as a
    /// no-op.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.armed == Some(token) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    /// Whether an alarm is currently armed
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}
