//! Prize identifiers.
//!
//! Prize ids are stable string keys used by the collection store and the
//! prize chute (e.g., `plush_cat`). They are validated on construction so a
//! persisted collection never carries blank or whitespace-laden entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted prize id length.
pub const MAX_PRIZE_ID_LEN: usize = 64;

/// Error returned when parsing an invalid [`PrizeId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrizeIdError {
    /// The id was empty after trimming.
    #[error("prize id cannot be empty")]
    Empty,
    /// The id exceeded [`MAX_PRIZE_ID_LEN`].
    #[error("prize id too long ({0} > {MAX_PRIZE_ID_LEN})")]
    TooLong(usize),
    /// The id contained a character outside `A-Za-z0-9_.:-`.
    #[error("prize id has invalid character {0:?} (allowed: A-Za-z0-9_.:-)")]
    InvalidChar(char),
}

/// A validated prize identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrizeId(String);

impl PrizeId {
    /// Parse a prize id, trimming surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, PrizeIdError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PrizeIdError::Empty);
        }
        if input.len() > MAX_PRIZE_ID_LEN {
            return Err(PrizeIdError::TooLong(input.len()));
        }
        if let Some(bad) = input
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | ':'))
        {
            return Err(PrizeIdError::InvalidChar(bad));
        }
        Ok(Self(input.to_string()))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrizeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrizeId {
    type Err = PrizeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PrizeId {
    type Error = PrizeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PrizeId> for String {
    fn from(id: PrizeId) -> Self {
        id.0
    }
}

/// Metadata carried by a prize-tagged object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeInfo {
    /// Collection key.
    pub id: PrizeId,
    /// Display name shown in the popup.
    pub name: String,
    /// Whether the popup model sits on an offset mount.
    #[serde(default)]
    pub raised_mount: bool,
}

impl PrizeInfo {
    /// Build prize info whose display name matches the id.
    pub fn new(id: PrizeId) -> Self {
        let name = id.to_string();
        Self {
            id,
            name,
            raised_mount: false,
        }
    }
}
