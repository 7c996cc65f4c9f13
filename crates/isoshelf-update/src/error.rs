use std::fmt;

use isoshelf_fetch::FetchError;
use isoshelf_library::ScanError;
use isoshelf_template::TemplateError;
use isoshelf_verify::{Sha256Digest, VerifyError};
use serde::Serialize;
use thiserror::Error;

use crate::VendorError;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Parse(String),

    #[error("version not found: {0}")]
    VersionNotFound(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("checksum mismatch for {file_name}: expected {expected}, got {actual}")]
    Mismatch {
        file_name: String,
        expected:  Sha256Digest,
        actual:    Sha256Digest,
    },

    #[error("no published checksum for {file_name}: {reason}")]
    MissingHash { file_name: String, reason: String },

    #[error(transparent)]
    Fs(#[from] isoshelf_fs::Error),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

impl From<VendorError> for UpdateError {
    fn from(e: VendorError) -> Self {
        match e {
            VendorError::Network(e) => Self::Fetch(e),
            VendorError::VersionNotFound { location } => Self::VersionNotFound(location),
            VendorError::HashNotFound { file_name, manifest } => Self::MissingHash {
                file_name,
                reason: format!("not listed in {manifest}"),
            },
            VendorError::Parse(message) => Self::Parse(message),
            VendorError::Template(e) => Self::Template(e),
        }
    }
}

/// Coarse classification of an [`UpdateError`] for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    #[serde(rename = "PARSE_ERROR")]
    Parse,
    #[serde(rename = "VERSION_NOT_FOUND")]
    VersionNotFound,
    #[serde(rename = "TEMPLATE_ERROR")]
    Template,
    #[serde(rename = "INTEGRITY_ERROR")]
    Integrity,
    #[serde(rename = "FILE_SYSTEM_ERROR")]
    FileSystem,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Parse => "PARSE_ERROR",
            Self::VersionNotFound => "VERSION_NOT_FOUND",
            Self::Template => "TEMPLATE_ERROR",
            Self::Integrity => "INTEGRITY_ERROR",
            Self::FileSystem => "FILE_SYSTEM_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(e) if e.is_network() => ErrorKind::Network,
            Self::Fetch(_) | Self::Fs(_) | Self::Scan(_) | Self::Verify(_) => ErrorKind::FileSystem,
            Self::Parse(_) => ErrorKind::Parse,
            Self::VersionNotFound(_) => ErrorKind::VersionNotFound,
            Self::Template(_) => ErrorKind::Template,
            Self::Mismatch { .. } | Self::MissingHash { .. } => ErrorKind::Integrity,
        }
    }
}
