use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use isoshelf_update::{ProgressSink, UpdateState};
use once_cell::sync::Lazy;

const PB_STYLE: &str =
    "{spinner:.blue} {msg:24} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const SPIN_STYLE: &str = "{spinner:.blue} {msg:24} [{elapsed_precise}]";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(PB_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(PB_CHARS))
});

static SPIN_TEMPLATE: Lazy<Option<ProgressStyle>> =
    Lazy::new(|| ProgressStyle::with_template(SPIN_STYLE).ok().map(|style| style.tick_chars(TICK)));

/// One bar per job, created on the job's first event.
#[derive(Default)]
pub struct ProgressTracker {
    multi: MultiProgress,
    bars:  Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressTracker {
    pub fn new() -> Self { Self::default() }

    fn bars(&self) -> MutexGuard<'_, HashMap<String, ProgressBar>> {
        self.bars.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bar(&self, job: &str) -> ProgressBar {
        self.bars()
            .entry(job.to_string())
            .or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::no_length());
                set_style(&bar, &SPIN_TEMPLATE);
                bar.set_message(job.to_string());
                bar
            })
            .clone()
    }
}

fn set_style(bar: &ProgressBar, style: &Lazy<Option<ProgressStyle>>) {
    if let Some(style) = style.as_ref() {
        bar.set_style(style.clone());
    }
}

impl ProgressSink for ProgressTracker {
    fn state(&self, job: &str, state: UpdateState) {
        let bar = self.bar(job);
        match state {
            UpdateState::Downloading => {
                set_style(&bar, &PB_TEMPLATE);
                bar.reset_elapsed();
            }
            UpdateState::Checking | UpdateState::Verifying => {
                set_style(&bar, &SPIN_TEMPLATE);
                bar.set_position(0);
                bar.enable_steady_tick(std::time::Duration::from_millis(120));
            }
            UpdateState::UpToDate | UpdateState::Replaced | UpdateState::Failed => {
                set_style(&bar, &SPIN_TEMPLATE);
                bar.finish_with_message(format!("{job} {state}"));
                return;
            }
        }
        bar.set_message(job.to_string());
    }

    fn bytes(&self, job: &str, downloaded: u64, total: Option<u64>) {
        let bar = self.bar(job);
        if let Some(total) = total {
            bar.set_length(total);
        }
        bar.set_position(downloaded);
    }
}
