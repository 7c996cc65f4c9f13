//! File-system primitives for the image library.
//!
//! Every image reaches its final name through a [`StagedFile`]: bytes are
//! written under a recognizable temporary name in the destination directory
//! and renamed into place only after verification. Nothing half-written is
//! ever visible under a final name. Staging files stay locked while in use,
//! so a sweep from another process cannot remove them.

mod error;
mod lock;
mod staging;

pub use error::{Error, Result};
pub use lock::{PathGuard, PathLocks};
pub use staging::{STAGING_PREFIX, STAGING_SUFFIX, StagedFile, is_staging_name, sweep_staging};

use std::path::Path;

/// Remove a file; a file that is already gone is not an error.
pub fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
