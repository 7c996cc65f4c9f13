use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sha2::Digest;

use crate::VerifyError;

/// A SHA-256 digest. Parsed from 64 hex characters in either case.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; 32]);

impl Sha256Digest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self { Self(bytes) }

    pub fn of(data: &[u8]) -> Self { Self::from_slice(&sha2::Sha256::digest(data)) }

    pub(crate) fn from_slice(out: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(out);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }

    /// Whether `s` looks like a digest; used to skip non-entry manifest lines.
    pub fn is_hex_digest(s: &str) -> bool {
        s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl FromStr for Sha256Digest {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !Self::is_hex_digest(trimmed) {
            return Err(VerifyError::InvalidDigest(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(trimmed, &mut bytes).map_err(|_| VerifyError::InvalidDigest(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&hex::encode(self.0)) }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Sha256Digest({self})") }
}

impl Serialize for Sha256Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
