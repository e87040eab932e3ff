//! Song identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidArgumentError};

/// Number of bytes in a song identifier.
pub const SONG_ID_LEN: usize = 12;

/// A validated song identifier.
///
/// Identifiers are assigned by the store when a song is ingested. They are
/// twelve bytes rendered as 24 lowercase hex characters: a big-endian
/// seconds timestamp, five random bytes and a three byte counter.
///
/// # Example
///
/// ```
/// use songlake_core::SongId;
///
/// let id = SongId::new("602B29014ACCF1B3F3D462D0").unwrap();
/// assert_eq!(id.as_str(), "602b29014accf1b3f3d462d0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SongId(String);

impl SongId {
    /// Parse a song identifier, normalizing it to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::SongId`] if the string is not exactly
    /// 24 hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Build an identifier from its raw bytes.
    pub fn from_bytes(bytes: [u8; SONG_ID_LEN]) -> Self {
        let mut s = String::with_capacity(SONG_ID_LEN * 2);
        for b in bytes {
            s.push_str(&format!("{:02x}", b));
        }
        Self(s)
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return Err(InvalidArgumentError::SongId {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if s.len() != SONG_ID_LEN * 2 {
            return Err(InvalidArgumentError::SongId {
                value: s.to_string(),
                reason: format!("expected {} hex characters", SONG_ID_LEN * 2),
            }
            .into());
        }

        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(InvalidArgumentError::SongId {
                value: s.to_string(),
                reason: format!("contains invalid character '{}'", c),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SongId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SongId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SongId> for String {
    fn from(id: SongId) -> Self {
        id.0
    }
}

impl AsRef<str> for SongId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
