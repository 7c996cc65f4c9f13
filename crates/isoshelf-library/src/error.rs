use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to list {path}: {source}")]
    ReadDir {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::ReadDir { source, .. } => source.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
