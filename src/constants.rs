//! Configuration constants for the trivia session engine
//!
//! This module contains all the limits and timing constraints used
//! throughout the engine to ensure data integrity and provide consistent
//! boundaries for sessions, players, and quiz snapshots.

/// Session lifecycle constants
pub mod session {
    use std::time::Duration;

    /// Fixed length of the countdown shown before a question opens
    pub const COUNTDOWN: Duration = Duration::from_secs(3);
    /// Smallest accepted auto-start threshold (0 disables auto-start)
    pub const MIN_AUTO_START: usize = 0;
    /// Largest accepted auto-start threshold
    pub const MAX_AUTO_START: usize = 50;
    /// Maximum number of non-ended sessions a single quiz may have at once
    pub const MAX_ACTIVE_SESSIONS_PER_QUIZ: usize = 10;
    /// Maximum number of players allowed in a single session
    pub const MAX_PLAYER_COUNT: usize = 500;
}

/// Player name constants
pub mod name {
    /// Maximum length of a player name in characters
    pub const MAX_LENGTH: usize = 30;
}

/// Quiz snapshot constants
pub mod quiz {
    /// Maximum length of a quiz title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum number of questions in a single quiz
    pub const MAX_QUESTION_COUNT: usize = 100;
}

/// Question snapshot constants
pub mod question {
    /// Minimum answering duration in milliseconds (durations may be fractional seconds)
    pub const MIN_DURATION_MS: u64 = 100;
    /// Maximum answering duration in milliseconds
    pub const MAX_DURATION_MS: u64 = 240_000;
    /// Minimum points awarded for the fastest fully correct answer
    pub const MIN_POINTS: f64 = 1.0;
    /// Maximum points awarded for the fastest fully correct answer
    pub const MAX_POINTS: f64 = 1000.0;
    /// Minimum number of answer options on a question
    pub const MIN_ANSWER_COUNT: usize = 2;
    /// Maximum number of answer options on a question
    pub const MAX_ANSWER_COUNT: usize = 8;
    /// Maximum length of the question text in characters
    pub const MAX_TEXT_LENGTH: usize = 200;
    /// Maximum length of an answer option's text in characters
    pub const MAX_ANSWER_TEXT_LENGTH: usize = 200;
}
