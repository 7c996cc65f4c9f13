//! Per-job result lines for the terminal and for `--json`.

use isoshelf_update::{Action, CheckReport, ErrorView, UpdateError, UpdateOutcome, UpdateState};
use serde::Serialize;

use crate::config::Rejected;

fn failure(error: &UpdateError) -> String { format!("{} {}: {error}", UpdateState::Failed, error.kind()) }

pub fn update_line(outcome: &UpdateOutcome) -> String {
    let status = match (&outcome.error, outcome.final_state, &outcome.installed_path) {
        (Some(error), _, _) => failure(error),
        (None, UpdateState::Replaced, Some(path)) => format!("{} {}", UpdateState::Replaced, path.display()),
        (None, state, _) => match &outcome.remote {
            Some(remote) => format!("{state} {remote}"),
            None => state.to_string(),
        },
    };
    format!("{}  {status}", outcome.label())
}

pub fn check_line(job: &str, result: &Result<CheckReport, UpdateError>) -> String {
    let status = match result {
        Ok(report) => match (&report.action, &report.local) {
            (Action::UpdateAvailable, Some(local)) => format!("{} {local} -> {}", report.action, report.remote),
            (Action::UpdateAvailable, None) => format!("{} {}", report.action, report.remote),
            (Action::UpToDate, _) => format!("{} {}", report.action, report.remote),
        },
        Err(error) => failure(error),
    };
    format!("{job}  {status}")
}

/// A job rejected before it ran, reported like any failed run.
pub fn rejected_outcome(rejected: Rejected) -> UpdateOutcome {
    UpdateOutcome {
        vendor:         rejected.vendor,
        selection:      rejected.selection,
        final_state:    UpdateState::Failed,
        local:          None,
        remote:         None,
        installed_path: None,
        removed:        Vec::new(),
        error:          Some(UpdateError::Template(rejected.error)),
    }
}

#[derive(Serialize)]
pub struct CheckView<'a> {
    pub job:    &'a str,
    pub report: Option<&'a CheckReport>,
    pub error:  Option<ErrorView>,
}

impl<'a> CheckView<'a> {
    pub fn new(job: &'a str, result: &'a Result<CheckReport, UpdateError>) -> Self {
        Self {
            job,
            report: result.as_ref().ok(),
            error: result.as_ref().err().map(ErrorView::from),
        }
    }
}
