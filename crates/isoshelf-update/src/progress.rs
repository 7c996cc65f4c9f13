use crate::UpdateState;

/// Receives progress from concurrently running jobs.
///
/// Calls arrive from several tasks at once and must not block.
pub trait ProgressSink: Send + Sync {
    fn state(&self, job: &str, state: UpdateState);

    fn bytes(&self, job: &str, downloaded: u64, total: Option<u64>);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn state(&self, _job: &str, _state: UpdateState) {}

    fn bytes(&self, _job: &str, _downloaded: u64, _total: Option<u64>) {}
}
