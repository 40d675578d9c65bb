//! Trip and user identifiers
//!
//! Trip IDs are UUIDs in the canonical 36-character hyphenated form
//! (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`), accepted in either case and
//! stored lowercase.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Length of the canonical hyphenated UUID form
const CANONICAL_LEN: usize = 36;

/// Rejected trip identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid trip ID format: {0}")]
pub struct TripIdError(pub String);

/// Validated trip identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripId(Uuid);

impl TripId {
    /// Generate a fresh random trip ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse and validate a caller-supplied identifier
    pub fn parse(s: &str) -> Result<Self, TripIdError> {
        // Uuid::try_parse also accepts simple, braced and urn forms
        if s.len() != CANONICAL_LEN {
            return Err(TripIdError(s.to_string()));
        }
        Uuid::try_parse(s).map(Self).map_err(|_| TripIdError(s.to_string()))
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TripId {
    type Err = TripIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Authenticated caller identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
