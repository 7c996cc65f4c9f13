use std::sync::Arc;
use std::time::Duration;

/// Time limits applied to every transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Establishing the connection and receiving response headers.
    pub connect: Duration,
    /// Longest silence tolerated between two body chunks.
    pub read:    Duration,
    /// Whole-request limit for small documents (index pages, manifests).
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            read:    Duration::from_secs(60),
            request: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Connecting,
    Downloading,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase:            FetchPhase,
    pub bytes_downloaded: u64,
    pub total_bytes:      Option<u64>,
}

impl Progress {
    pub fn percentage(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) | None => None,
            Some(total) => Some(self.bytes_downloaded as f64 * 100.0 / total as f64),
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;
