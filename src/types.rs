//! Core value types shared by the digest and decision engines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw BLAKE3 digest of a single file's content
pub type Digest = [u8; 32];

/// Fingerprint reported when there is nothing to compare (no data files).
pub const EMPTY_FINGERPRINT: &str = "none";

/// Hex-encoded fingerprint of a directory's relevant content.
///
/// This is exactly the text stored in a checksum artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a finalized digest.
    pub fn from_digest(digest: &Digest) -> Self {
        Self(hex::encode(digest))
    }

    /// The sentinel used for directories without data files.
    pub fn empty() -> Self {
        Self(EMPTY_FINGERPRINT.to_string())
    }

    /// Parse the content of a checksum artifact.
    ///
    /// Only the first line is significant; surrounding whitespace is ignored.
    pub fn parse_artifact(content: &str) -> Option<Self> {
        let line = content.lines().next()?.trim();
        if line.is_empty() {
            None
        } else {
            Some(Self(line.to_string()))
        }
    }

    pub fn is_empty_sentinel(&self) -> bool {
        self.0 == EMPTY_FINGERPRINT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Archive password. Never printed.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}
