use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The client failed before or during the transfer: DNS, connect, TLS,
    /// non-success status, or a broken body stream.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("no data from {url} for {}s", after.as_secs())]
    Timeout { url: String, after: Duration },

    #[error("transfer from {url} ended after {received} of {expected} bytes")]
    Incomplete {
        url:      String,
        expected: u64,
        received: u64,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub(crate) fn network(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Network {
            url:     url.to_string(),
            message: err.to_string(),
        }
    }

    /// Whether the failure happened on the wire rather than on local disk.
    pub fn is_network(&self) -> bool { !matches!(self, Self::Write { .. }) }
}

pub type Result<T> = std::result::Result<T, FetchError>;
