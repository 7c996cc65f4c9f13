use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::TempPath;

use crate::{Error, Result};

/// Name prefix of every staging file.
pub const STAGING_PREFIX: &str = ".isoshelf-";
/// Name suffix of every staging file.
pub const STAGING_SUFFIX: &str = ".part";

/// Whether `name` was produced by [`StagedFile::create_in`].
pub fn is_staging_name(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) && name.ends_with(STAGING_SUFFIX)
}

/// A temporary file living next to its final destination.
///
/// The file is removed when dropped, so an aborted or failed download never
/// leaves bytes behind. [`commit`](Self::commit) renames it into place; the
/// rename stays on one volume and is therefore atomic.
///
/// An exclusive lock is held on the file from creation until it is committed
/// or removed, so [`sweep_staging`] in another process leaves it alone.
#[derive(Debug)]
pub struct StagedFile {
    // Closed before `temp` deletes the file.
    file: File,
    temp: TempPath,
}

impl StagedFile {
    /// Create an empty staging file in `dir`, creating `dir` if needed.
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let named = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(dir)
            .map_err(|source| Error::Stage {
                dir: dir.to_path_buf(),
                source,
            })?;
        named.as_file().try_lock_exclusive().map_err(|source| Error::Lock {
            path: named.path().to_path_buf(),
            source,
        })?;

        let (file, temp) = named.into_parts();
        Ok(Self { file, temp })
    }

    pub fn path(&self) -> &Path { &self.temp }

    /// A second handle on the locked file, for writing.
    pub fn reopen(&self) -> io::Result<File> { self.file.try_clone() }

    /// Atomically rename onto `destination`, replacing any existing file.
    ///
    /// On failure the staging file is removed.
    pub fn commit(self, destination: impl AsRef<Path>) -> Result<PathBuf> {
        let Self { file, temp } = self;
        let destination = destination.as_ref();
        let from = temp.to_path_buf();
        // Renamed while still locked; the lock goes with `file` afterwards.
        let _file = file;
        temp.persist(destination).map_err(|e| Error::Commit {
            from,
            to: destination.to_path_buf(),
            source: e.error,
        })?;
        Ok(destination.to_path_buf())
    }

    /// Remove the staging file now, reporting failures instead of ignoring them.
    pub fn discard(self) -> Result<()> {
        let Self { file, temp } = self;
        drop(file);
        let path = temp.to_path_buf();
        temp.close().map_err(|source| Error::Remove { path, source })
    }
}

/// Remove staging files left in `dir` by a process that was killed mid-download.
///
/// Files still locked by a live [`StagedFile`], in this process or another,
/// are skipped. A missing directory is treated as empty.
pub fn sweep_staging(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(Error::ReadDir {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let is_staging = entry.file_name().to_str().is_some_and(is_staging_name);
        if !is_staging {
            continue;
        }
        let path = entry.path();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => return Err(Error::Lock { path, source }),
        };
        if file.try_lock_exclusive().is_err() {
            continue;
        }
        fs::remove_file(&path).map_err(|source| Error::Remove {
            path: path.clone(),
            source,
        })?;
        removed.push(path);
    }
    Ok(removed)
}
