use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use isoshelf_fs::is_staging_name;
use isoshelf_template::{FileNameTemplate, Placeholder};
use isoshelf_version::{LengthOrder, Separators, VersionId};
use serde::Serialize;

use crate::{Result, ScanError, Selection};

/// An image already present in the library, as recognized from its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalFileRecord {
    pub path:     PathBuf,
    pub version:  VersionId,
    pub edition:  Option<String>,
    pub language: Option<String>,
}

impl LocalFileRecord {
    pub fn file_name(&self) -> Option<&str> { self.path.file_name().and_then(|n| n.to_str()) }
}

/// A view of one vendor's target directory through its file-name template.
///
/// Scanning only reads the directory. Staging files, subdirectories, names
/// that are not UTF-8, and names whose version does not parse are ignored.
#[derive(Debug, Clone)]
pub struct LocalLibrary<'a> {
    dir:        &'a Path,
    template:   &'a FileNameTemplate,
    separators: Separators,
    order:      LengthOrder,
}

impl<'a> LocalLibrary<'a> {
    pub fn new(dir: &'a Path, template: &'a FileNameTemplate) -> Self {
        Self {
            dir,
            template,
            separators: Separators::default(),
            order: LengthOrder::default(),
        }
    }

    pub fn separators(mut self, separators: Separators) -> Self {
        self.separators = separators;
        self
    }

    pub fn length_order(mut self, order: LengthOrder) -> Self {
        self.order = order;
        self
    }

    pub fn dir(&self) -> &Path { self.dir }

    /// The newest image matching `selection`, if any.
    pub fn scan(&self, selection: &Selection) -> Result<Option<LocalFileRecord>> {
        Ok(self.records(selection)?.pop())
    }

    /// Every other image matching `selection`: what an install of `keep`
    /// leaves obsolete.
    pub fn list_superseded(&self, keep: &LocalFileRecord, selection: &Selection) -> Result<Vec<PathBuf>> {
        Ok(self
            .records(selection)?
            .into_iter()
            .filter(|r| r.path != keep.path)
            .map(|r| r.path)
            .collect())
    }

    /// All matching images, oldest first. Equal versions are ordered by name.
    pub fn records(&self, selection: &Selection) -> Result<Vec<LocalFileRecord>> {
        let entries = match fs::read_dir(self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.read_dir_error(source)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| self.read_dir_error(source))?;
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if is_staging_name(&name) || !path.is_file() {
                continue;
            }
            if let Some(record) = self.recognize(path, &name, selection) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| match a.version.compare(&b.version, self.order) {
            Ordering::Equal => a.path.cmp(&b.path),
            other => other,
        });
        Ok(records)
    }

    fn recognize(&self, path: PathBuf, name: &str, selection: &Selection) -> Option<LocalFileRecord> {
        let captured = self.template.capture(name)?;
        if !selection.accepts(&captured) {
            return None;
        }
        let raw = captured.get(Placeholder::Version)?;
        let version = match VersionId::parse(raw, &self.separators) {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!(file = name, error = %e, "ignoring file with unparsable version");
                return None;
            }
        };
        Some(LocalFileRecord {
            path,
            version,
            edition: captured.get(Placeholder::Edition).map(str::to_owned),
            language: captured.get(Placeholder::Language).map(str::to_owned),
        })
    }

    fn read_dir_error(&self, source: std::io::Error) -> ScanError {
        ScanError::ReadDir {
            path: self.dir.to_path_buf(),
            source,
        }
    }
}
