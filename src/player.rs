//! Player identity and the join-ordered roster
//!
//! This module defines player identifiers and the roster of players joined
//! to a session. Join order is significant: it breaks ties both in scoring
//! ranks (simultaneous submissions) and in the final leaderboard (equal
//! totals), so the roster preserves insertion order.

use std::{fmt::Display, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use super::names::{self, NameStyle, Names};

/// A unique identifier for a player within a session
///
/// Player IDs are random UUIDs, so they are unique session-wide (and in
/// practice globally, though only session-wide uniqueness is relied upon).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random player ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random player ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
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

/// Errors that can occur when joining a session's roster
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The session has reached the maximum number of allowed players
    #[error("maximum number of players reached")]
    Full,
    /// The requested name was rejected
    #[error(transparent)]
    Name(#[from] names::Error),
}

/// The join-ordered list of players in one session
///
/// Backed by an [`IndexMap`] so that iteration always yields players in the
/// order they joined.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Roster {
    /// Players keyed by ID, ordered by join time
    players: IndexMap<Id, String>,
    /// Name registry enforcing uniqueness and generating names
    names: Names,
}

impl Roster {
    /// Adds a player to the roster and returns their new ID
    ///
    /// An empty (or whitespace-only) requested name yields a generated name
    /// guaranteed unique within the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Full`] if the roster is at capacity, or a name
    /// validation error for a rejected requested name.
    pub fn join(&mut self, requested: &str, style: NameStyle) -> Result<Id, Error> {
        if self.players.len() >= crate::constants::session::MAX_PLAYER_COUNT {
            return Err(Error::Full);
        }

        let id = Id::new();
        let name = self.names.claim(id, requested, style)?;
        self.players.insert(id, name);

        Ok(id)
    }

    /// Checks whether a player belongs to this roster
    pub fn contains(&self, id: Id) -> bool {
        self.players.contains_key(&id)
    }

    /// Gets a player's display name
    pub fn name_of(&self, id: Id) -> Option<&str> {
        self.players.get(&id).map(String::as_str)
    }

    /// Gets a player's position in join order (0-based)
    pub fn join_index(&self, id: Id) -> Option<usize> {
        self.players.get_index_of(&id)
    }

    /// Iterates over `(id, name)` pairs in join order
    pub fn iter(&self) -> impl Iterator<Item = (Id, &str)> {
        self.players.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Returns all player names in join order
    pub fn player_names(&self) -> Vec<String> {
        self.players.values().cloned().collect()
    }

    /// Returns the number of joined players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Checks whether no players have joined
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
