//! Session ID generation and management
//!
//! This module provides functionality for generating unique session IDs.
//! Session IDs are displayed in octal format to make them easier to
//! communicate verbally when inviting players.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Minimum value for generated session IDs (in octal: 10000)
const MIN_VALUE: u16 = 0o10_000;
/// Maximum value for generated session IDs (in octal: 100000)
const MAX_VALUE: u16 = 0o100_000;

/// A unique identifier for a running session
///
/// Session IDs are generated randomly within a fixed range and displayed
/// as 5-digit octal numbers, which reduces confusion when sharing them
/// verbally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u16);

impl SessionId {
    /// Creates a new random session ID
    ///
    /// The ID is generated within the valid range so that it always
    /// displays as a 5-digit octal number.
    pub fn new() -> Self {
        Self(fastrand::u16(MIN_VALUE..MAX_VALUE))
    }
}

impl Default for SessionId {
    /// Creates a new random session ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    /// Formats the session ID as a 5-digit octal number
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05o}", self.0)
    }
}

impl Serialize for SessionId {
    /// Serializes the session ID as an octal string
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SessionId {
    /// Deserializes a session ID from an octal string
    fn deserialize<D>(deserializer: D) -> Result<SessionId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SessionId::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl FromStr for SessionId {
    type Err = ParseIntError;

    /// Parses a session ID from an octal string representation
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string cannot be parsed as a valid
    /// octal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(u16::from_str_radix(s, 8)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_new_in_range() {
        for _ in 0..100 {
            let id = SessionId::new();
            assert!(id.0 >= MIN_VALUE);
            assert!(id.0 < MAX_VALUE);
        }
    }

    #[test]
    fn test_session_id_display_format() {
        assert_eq!(SessionId(MIN_VALUE).to_string(), "10000");
        assert_eq!(SessionId(MIN_VALUE + 1).to_string(), "10001");
        assert_eq!(SessionId(MAX_VALUE - 1).to_string(), "77777");
    }

    #[test]
    fn test_session_id_from_str() {
        assert_eq!(SessionId::from_str("10000").unwrap().0, MIN_VALUE);
        assert_eq!(SessionId::from_str("12345").unwrap().0, 0o12345);
        assert_eq!(SessionId::from_str("77777").unwrap().0, 0o77777);
    }

    #[test]
    fn test_session_id_from_str_invalid() {
        assert!(SessionId::from_str("invalid").is_err());
        assert!(SessionId::from_str("888").is_err()); // invalid octal digit
        assert!(SessionId::from_str("").is_err());
    }

    #[test]
    fn test_session_id_serialization() {
        let id = SessionId(0o12345);
        let serialized = serde_json::to_string(&id).unwrap();
        assert_eq!(serialized, "\"12345\"");

        let deserialized: SessionId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn test_session_id_deserialization_parse_error() {
        let result: Result<SessionId, _> = serde_json::from_str("\"999\"");
        assert!(result.is_err());
    }
}
