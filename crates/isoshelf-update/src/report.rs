use std::fmt;
use std::path::PathBuf;

use isoshelf_library::Selection;
use isoshelf_version::VersionId;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::{ErrorKind, UpdateError};

/// `vendor` or `vendor:edition/language`, for logs and result lines.
pub fn job_label(vendor: &str, selection: &Selection) -> String {
    if selection.edition.is_none() && selection.language.is_none() {
        vendor.to_string()
    } else {
        format!("{vendor}:{selection}")
    }
}

/// The serialized form of an [`UpdateError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub kind:    ErrorKind,
    pub message: String,
}

impl From<&UpdateError> for ErrorView {
    fn from(error: &UpdateError) -> Self {
        Self {
            kind:    error.kind(),
            message: error.to_string(),
        }
    }
}

/// Where an update run is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateState {
    Checking,
    Downloading,
    Verifying,
    UpToDate,
    Replaced,
    Failed,
}

impl UpdateState {
    pub fn is_terminal(self) -> bool { matches!(self, Self::UpToDate | Self::Replaced | Self::Failed) }

    pub fn is_success(self) -> bool { matches!(self, Self::UpToDate | Self::Replaced) }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Downloading => "DOWNLOADING",
            Self::Verifying => "VERIFYING",
            Self::UpToDate => "UP_TO_DATE",
            Self::Replaced => "REPLACED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    UpToDate,
    UpdateAvailable,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UpToDate => "UP_TO_DATE",
            Self::UpdateAvailable => "UPDATE_AVAILABLE",
        })
    }
}

/// Result of a read-only check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub vendor:    String,
    pub selection: Selection,
    pub local:     Option<VersionId>,
    pub remote:    VersionId,
    pub action:    Action,
}

/// Result of one update run. `error` is set exactly when `final_state` is
/// [`UpdateState::Failed`].
#[derive(Debug)]
pub struct UpdateOutcome {
    pub vendor:         String,
    pub selection:      Selection,
    pub final_state:    UpdateState,
    pub local:          Option<VersionId>,
    pub remote:         Option<VersionId>,
    pub installed_path: Option<PathBuf>,
    /// Superseded files that were deleted after the install.
    pub removed:        Vec<PathBuf>,
    pub error:          Option<UpdateError>,
}

impl UpdateOutcome {
    pub fn label(&self) -> String { job_label(&self.vendor, &self.selection) }
}

impl Serialize for UpdateOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let error = self.error.as_ref().map(ErrorView::from);

        let mut s = serializer.serialize_struct("UpdateOutcome", 8)?;
        s.serialize_field("vendor", &self.vendor)?;
        s.serialize_field("selection", &self.selection)?;
        s.serialize_field("final_state", &self.final_state)?;
        s.serialize_field("local", &self.local)?;
        s.serialize_field("remote", &self.remote)?;
        s.serialize_field("installed_path", &self.installed_path)?;
        s.serialize_field("removed", &self.removed)?;
        s.serialize_field("error", &error)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoshelf_version::Separators;

    #[test]
    fn test_terminal_states() {
        assert!(!UpdateState::Checking.is_terminal());
        assert!(UpdateState::Failed.is_terminal());
        assert!(!UpdateState::Failed.is_success());
        assert!(UpdateState::Replaced.is_success());
    }

    #[test]
    fn test_job_label() {
        assert_eq!(job_label("kali", &Selection::new()), "kali");
        assert_eq!(job_label("debian", &Selection::new().edition("kde")), "debian:kde");
        assert_eq!(job_label("win", &Selection::new().edition("x64").language("en")), "win:x64/en");
    }

    #[test]
    fn test_outcome_json() {
        let outcome = UpdateOutcome {
            vendor:         "debian".into(),
            selection:      Selection::new().edition("kde"),
            final_state:    UpdateState::Failed,
            local:          None,
            remote:         Some(VersionId::parse("12.5.0", &Separators::default()).unwrap()),
            installed_path: None,
            removed:        Vec::new(),
            error:          Some(UpdateError::Parse("no links".into())),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["final_state"], "FAILED");
        assert_eq!(json["remote"], "12.5.0");
        assert_eq!(json["error"]["kind"], "PARSE_ERROR");
        assert_eq!(json["error"]["message"], "no links");
    }
}
