use std::io;
use std::path::PathBuf;

use crate::Sha256Digest;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch {
        expected: Sha256Digest,
        actual:   Sha256Digest,
    },

    #[error("invalid SHA-256 digest: {0:?}")]
    InvalidDigest(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
