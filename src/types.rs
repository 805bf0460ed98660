//! Core identifier types for the mirror store.

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hex characters in a SHA-256 digest string.
pub const DIGEST_HEX_LEN: usize = 64;

/// A 64-character lowercase hex SHA-256 digest identifying a tree's
/// content and structure.
///
/// Two digests are equal iff the trees they were computed from are
/// structurally and content-identical: same relative paths, same file
/// bytes, same symlink targets. Permissions, ownership and timestamps
/// never contribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Wrap a raw 32-byte SHA-256 output as a hex digest.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Digest(hex::encode(bytes))
    }

    /// Parse and validate a digest string.
    pub fn parse(s: &str) -> Result<Self, SourceError> {
        if s.len() != DIGEST_HEX_LEN
            || !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(SourceError::InvalidRef(s.to_string()));
        }
        Ok(Digest(s.to_string()))
    }

    /// The digest as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Digest {
    type Error = SourceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Digest::parse(&s)
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> String {
        d.0
    }
}
