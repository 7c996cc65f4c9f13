use std::cmp::Ordering;
use std::io::{Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

use isoshelf_fetch::{Fetcher, HttpClient, Progress, ProgressCallback};
use isoshelf_fs::{PathLocks, StagedFile};
use isoshelf_library::{LocalFileRecord, LocalLibrary, Selection};
use isoshelf_verify::{Sha256Digest, VerifyError, sha256_reader};
use isoshelf_version::VersionId;
use tracing::Instrument;

use crate::batch::run_batch;
use crate::{
    Action, CheckReport, NoProgress, ProgressSink, UpdateError, UpdateOutcome, UpdateState, Vendor, VendorProfile,
    job_label,
};

/// One vendor and selection kept current in one directory.
#[derive(Debug)]
pub struct UpdateJob<V> {
    pub vendor:    Arc<V>,
    pub directory: PathBuf,
    pub selection: Selection,
}

impl<V> Clone for UpdateJob<V> {
    fn clone(&self) -> Self {
        Self {
            vendor:    self.vendor.clone(),
            directory: self.directory.clone(),
            selection: self.selection.clone(),
        }
    }
}

impl<V: Vendor> UpdateJob<V> {
    pub fn new(vendor: Arc<V>, directory: impl Into<PathBuf>, selection: Selection) -> Self {
        Self {
            vendor,
            directory: directory.into(),
            selection,
        }
    }

    /// `vendor` or `vendor:edition/language`, for logs and progress.
    pub fn label(&self) -> String { job_label(self.vendor.profile().name(), &self.selection) }
}

/// Drives the check, download, verify and replace workflow.
///
/// Runs never retry on their own. Writes to one destination path are
/// serialized through the shared [`PathLocks`].
pub struct Updater<C: HttpClient> {
    fetcher:  Arc<Fetcher<C>>,
    locks:    PathLocks,
    progress: Arc<dyn ProgressSink>,
}

impl<C: HttpClient> Updater<C> {
    pub fn new(fetcher: Arc<Fetcher<C>>) -> Self {
        Self {
            fetcher,
            locks: PathLocks::new(),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_locks(mut self, locks: PathLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn fetcher(&self) -> &Arc<Fetcher<C>> { &self.fetcher }

    /// Compare the installed and published versions without writing anything.
    pub async fn check<V: Vendor>(&self, job: &UpdateJob<V>) -> Result<CheckReport, UpdateError> {
        let span = tracing::info_span!("check", vendor = job.vendor.profile().name(), selection = %job.selection);
        self.run_check(job).instrument(span).await
    }

    async fn run_check<V: Vendor>(&self, job: &UpdateJob<V>) -> Result<CheckReport, UpdateError> {
        let profile = job.vendor.profile();
        let selection = profile.canonical_selection(&job.selection)?;
        let remote = job.vendor.fetch_latest_version(&selection).await?;
        let local = profile.library(&job.directory).scan(&selection)?;

        let action = if is_current(local.as_ref(), &remote, profile) {
            Action::UpToDate
        } else {
            Action::UpdateAvailable
        };
        tracing::debug!(remote = %remote, %action, "checked");

        Ok(CheckReport {
            vendor: profile.name().to_string(),
            selection,
            local: local.map(|r| r.version),
            remote,
            action,
        })
    }

    /// Bring `job` up to date. Never panics or returns early: every failure
    /// ends in [`UpdateState::Failed`] with the library as it was before.
    pub async fn update<V: Vendor>(&self, job: &UpdateJob<V>) -> UpdateOutcome {
        let span = tracing::info_span!(
            "update",
            vendor = job.vendor.profile().name(),
            edition = job.selection.edition.as_deref(),
            language = job.selection.language.as_deref(),
        );
        self.run_update(job).instrument(span).await
    }

    async fn run_update<V: Vendor>(&self, job: &UpdateJob<V>) -> UpdateOutcome {
        let label = job.label();
        let mut outcome = UpdateOutcome {
            vendor:         job.vendor.profile().name().to_string(),
            selection:      job.selection.clone(),
            final_state:    UpdateState::Checking,
            local:          None,
            remote:         None,
            installed_path: None,
            removed:        Vec::new(),
            error:          None,
        };

        match self.drive(job, &label, &mut outcome).await {
            Ok(state) => outcome.final_state = state,
            Err(e) => {
                tracing::error!(kind = %e.kind(), error = %e, "update failed");
                outcome.final_state = UpdateState::Failed;
                outcome.error = Some(e);
            }
        }
        self.progress.state(&label, outcome.final_state);
        outcome
    }

    async fn drive<V: Vendor>(
        &self,
        job: &UpdateJob<V>,
        label: &str,
        outcome: &mut UpdateOutcome,
    ) -> Result<UpdateState, UpdateError> {
        let vendor = &*job.vendor;
        let profile = vendor.profile();
        self.progress.state(label, UpdateState::Checking);

        let selection = profile.canonical_selection(&job.selection)?;
        outcome.selection = selection.clone();

        let remote = vendor.fetch_latest_version(&selection).await?;
        outcome.remote = Some(remote.clone());

        let library = profile.library(&job.directory);
        let local = library.scan(&selection)?;
        outcome.local = local.as_ref().map(|r| r.version.clone());
        if is_current(local.as_ref(), &remote, profile) {
            tracing::info!(version = %remote, "up to date");
            return Ok(UpdateState::UpToDate);
        }

        let file_name = profile.file_name(&remote, &selection)?;
        let destination = job.directory.join(&file_name);
        let _guard = self.locks.lock(&destination).await;

        // A concurrent run may have installed it while we waited.
        let local = library.scan(&selection)?;
        if is_current(local.as_ref(), &remote, profile) {
            outcome.local = local.map(|r| r.version);
            tracing::info!(version = %remote, "installed by a concurrent run");
            return Ok(UpdateState::UpToDate);
        }

        tracing::info!(local = ?outcome.local.as_ref().map(ToString::to_string), remote = %remote, "update available");
        self.progress.state(label, UpdateState::Downloading);
        let url = vendor.get_download_link(&remote, &selection).await?;
        let staged = StagedFile::create_in(&job.directory)?;
        let callback = self.byte_callback(label);
        let bytes = self.fetcher.download(url.as_str(), &staged, Some(&callback)).await?;
        tracing::info!(%url, bytes, "downloaded");

        self.progress.state(label, UpdateState::Verifying);
        let expected = vendor.get_expected_hash(&remote, &selection, &file_name).await?;
        let actual = hash_staged(&staged).await?;
        if actual != expected {
            if let Err(e) = staged.discard() {
                tracing::warn!(error = %e, "failed to remove rejected download");
            }
            return Err(UpdateError::Mismatch {
                file_name,
                expected,
                actual,
            });
        }

        let installed = staged.commit(&destination)?;
        tracing::info!(path = %installed.display(), version = %remote, "installed");
        outcome.installed_path = Some(installed.clone());

        let keep = LocalFileRecord {
            path:     installed,
            version:  remote,
            edition:  selection.edition.clone(),
            language: selection.language.clone(),
        };
        outcome.removed = remove_superseded(&library, &keep, &selection);
        Ok(UpdateState::Replaced)
    }

    fn byte_callback(&self, label: &str) -> ProgressCallback {
        let sink = self.progress.clone();
        let label = label.to_string();
        Arc::new(move |p: &Progress| sink.bytes(&label, p.bytes_downloaded, p.total_bytes))
    }

    /// Check every job, at most `workers` at a time. Results follow job order.
    pub async fn check_all<V: Vendor>(
        &self,
        jobs: &[UpdateJob<V>],
        workers: usize,
    ) -> Vec<Result<CheckReport, UpdateError>> {
        run_batch(jobs, workers, |job| self.check(job)).await
    }

    /// Update every job, at most `workers` at a time. One job failing does
    /// not stop the others. Results follow job order.
    pub async fn update_all<V: Vendor>(&self, jobs: &[UpdateJob<V>], workers: usize) -> Vec<UpdateOutcome> {
        run_batch(jobs, workers, |job| self.update(job)).await
    }
}

fn is_current(local: Option<&LocalFileRecord>, remote: &VersionId, profile: &VendorProfile) -> bool {
    local.is_some_and(|r| r.version.compare(remote, profile.length_order()) != Ordering::Less)
}

/// Hash the staged bytes through its locked handle.
async fn hash_staged(staged: &StagedFile) -> Result<Sha256Digest, UpdateError> {
    let read_err = |source| VerifyError::Read {
        path: staged.path().to_path_buf(),
        source,
    };
    let mut file = staged.reopen().map_err(read_err)?;
    let digest = tokio::task::spawn_blocking(move || {
        file.seek(SeekFrom::Start(0))?;
        sha256_reader(file)
    })
    .await
    .map_err(|e| VerifyError::Io(std::io::Error::other(e)))?
    .map_err(read_err)?;
    Ok(digest)
}

/// Delete what the new install replaces. Failures are logged only: the new
/// image is already committed.
fn remove_superseded(library: &LocalLibrary<'_>, keep: &LocalFileRecord, selection: &Selection) -> Vec<PathBuf> {
    let stale = match library.list_superseded(keep, selection) {
        Ok(stale) => stale,
        Err(e) => {
            tracing::warn!(error = %e, "could not list superseded images");
            return Vec::new();
        }
    };

    let mut removed = Vec::with_capacity(stale.len());
    for path in stale {
        match isoshelf_fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed superseded image");
                removed.push(path);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove superseded image"),
        }
    }
    removed
}
