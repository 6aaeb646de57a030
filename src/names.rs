//! Player name management and validation
//!
//! This module handles the assignment and validation of player names within
//! a session. It ensures name uniqueness, filters inappropriate content,
//! and generates a session-unique name when a player joins without
//! requesting one.

use std::collections::{HashMap, HashSet};

use heck::ToTitleCase;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::player::Id;

/// Defines the style of automatically generated player names
///
/// When a player joins with an empty name, this enum determines what type
/// of name is generated for them.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub enum NameStyle {
    /// Roman-style names (praenomen + nomen, optionally + cognomen)
    Roman(usize),
    /// Pet-style names (adjective + animal combinations)
    Petname(usize),
}

impl Default for NameStyle {
    /// Default name style is Petname with 2 words
    fn default() -> Self {
        Self::Petname(2)
    }
}

impl NameStyle {
    /// Generates a random name according to this style
    pub fn get_name(&self) -> String {
        match self {
            Self::Roman(count) => romanname::romanname(romanname::NameConfig {
                praenomen: *count > 2,
            }),
            Self::Petname(count) => petname::petname(*count as u8, " ").unwrap_or_default(),
        }
        .to_title_case()
    }
}

/// Serialization helper for Names struct
#[derive(Deserialize)]
struct NamesSerde {
    mapping: HashMap<Id, String>,
}

/// Manages player names and their associations with player IDs
///
/// This struct maintains a bidirectional mapping between player IDs and
/// names, ensuring that names are unique within a session and meet content
/// and length requirements.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "NamesSerde")]
pub struct Names {
    /// Primary mapping from player ID to name
    mapping: HashMap<Id, String>,

    /// Reverse mapping from name to player ID (not serialized)
    #[serde(skip_serializing)]
    reverse_mapping: HashMap<String, Id>,
    /// Set of all taken names for quick uniqueness checks (not serialized)
    #[serde(skip_serializing)]
    existing: HashSet<String>,
}

impl From<NamesSerde> for Names {
    /// Reconstructs the Names struct from serialized data
    ///
    /// This rebuilds the reverse mapping and taken-name set from the
    /// primary mapping, which is necessary since these fields are not
    /// serialized.
    fn from(serde: NamesSerde) -> Self {
        let NamesSerde { mapping } = serde;
        let mut reverse_mapping = HashMap::new();
        let mut existing = HashSet::new();
        for (id, name) in &mapping {
            reverse_mapping.insert(name.to_owned(), *id);
            existing.insert(name.to_owned());
        }
        Self {
            mapping,
            reverse_mapping,
            existing,
        }
    }
}

/// Errors that can occur during name validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested name is already in use by another player
    #[error("name already in-use")]
    Used,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

impl Names {
    /// Claims a name for a player, generating one when none is requested
    ///
    /// A non-empty request is validated (length, content filtering,
    /// uniqueness) and assigned as-is after whitespace trimming. An empty
    /// request produces a generated name in the given style, retried until
    /// it is unique within the session, so the returned name is always
    /// guaranteed unique.
    ///
    /// # Errors
    ///
    /// * `Error::TooLong` - requested name exceeds the length limit
    /// * `Error::Sinful` - requested name contains inappropriate content
    /// * `Error::Used` - requested name is already taken in this session
    pub fn claim(&mut self, id: Id, requested: &str, style: NameStyle) -> Result<String, Error> {
        if requested.len() > crate::constants::name::MAX_LENGTH {
            return Err(Error::TooLong);
        }
        let requested = rustrict::trim_whitespace(requested);
        if requested.is_empty() {
            let name = loop {
                let candidate = style.get_name();
                if !candidate.is_empty() && !self.existing.contains(&candidate) {
                    break candidate;
                }
            };
            self.insert(id, name.clone());
            return Ok(name);
        }
        if requested.is_inappropriate() {
            return Err(Error::Sinful);
        }
        if self.existing.contains(requested) {
            return Err(Error::Used);
        }
        self.insert(id, requested.to_owned());
        Ok(requested.to_owned())
    }

    fn insert(&mut self, id: Id, name: String) {
        self.existing.insert(name.clone());
        self.reverse_mapping.insert(name.clone(), id);
        self.mapping.insert(id, name);
    }

    /// Retrieves the name associated with a player ID
    pub fn get_name(&self, id: &Id) -> Option<String> {
        self.mapping.get(id).map(std::borrow::ToOwned::to_owned)
    }

    /// Retrieves the player ID associated with a name
    pub fn get_id(&self, name: &str) -> Option<Id> {
        self.reverse_mapping.get(name).copied()
    }
}
