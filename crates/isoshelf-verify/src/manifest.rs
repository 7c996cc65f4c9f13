//! Vendor checksum lists.

use serde::Serialize;

use crate::Sha256Digest;

/// One `(file name, digest)` line of a checksum list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub file_name: String,
    pub digest:    Sha256Digest,
}

/// Line layout of a checksum list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    /// Per line: BSD style when the line starts with `SHA256 (`, GNU otherwise.
    #[default]
    Auto,
    /// `sha256sum` output: `<digest>  <name>` or `<digest> *<name>`.
    Gnu,
    /// `SHA256 (<name>) = <digest>`.
    Bsd,
    /// Whitespace-separated columns at fixed positions.
    Columns { digest: usize, name: usize },
}

/// Parse with [`ManifestFormat::Auto`].
pub fn parse_manifest(text: &str) -> Vec<ManifestEntry> { parse_manifest_with(text, ManifestFormat::Auto) }

/// Blank lines, `#` comments, and lines without a well-formed digest (PGP
/// armour, headers) are skipped.
pub fn parse_manifest_with(text: &str, format: ManifestFormat) -> Vec<ManifestEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| parse_line(line, format))
        .collect()
}

fn parse_line(line: &str, format: ManifestFormat) -> Option<ManifestEntry> {
    let (digest, name) = match format {
        ManifestFormat::Auto if line.starts_with("SHA256 (") => split_bsd(line)?,
        ManifestFormat::Auto | ManifestFormat::Gnu => split_gnu(line)?,
        ManifestFormat::Bsd => split_bsd(line)?,
        ManifestFormat::Columns { digest, name } => {
            let columns: Vec<&str> = line.split_whitespace().collect();
            (*columns.get(digest)?, *columns.get(name)?)
        }
    };

    if name.is_empty() {
        return None;
    }
    let digest = digest.parse().ok()?;
    Some(ManifestEntry {
        file_name: name.to_string(),
        digest,
    })
}

fn split_gnu(line: &str) -> Option<(&str, &str)> {
    let (digest, rest) = line.split_once(char::is_whitespace)?;
    let name = rest.trim_start();
    Some((digest, name.strip_prefix('*').unwrap_or(name)))
}

fn split_bsd(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("SHA256 (")?;
    let (name, digest) = rest.rsplit_once(") = ")?;
    Some((digest, name))
}

/// The entry for the first candidate name that appears in `entries`.
///
/// Candidates are tried in order, so callers list the preferred spelling
/// first (`image.iso` before `./image.iso`). Within one candidate the first
/// manifest line wins.
pub fn find_entry<'a, S: AsRef<str>>(
    entries: &'a [ManifestEntry],
    candidates: impl IntoIterator<Item = S>,
) -> Option<&'a ManifestEntry> {
    candidates
        .into_iter()
        .find_map(|candidate| entries.iter().find(|e| e.file_name == candidate.as_ref()))
}
