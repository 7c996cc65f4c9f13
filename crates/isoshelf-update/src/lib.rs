//! The update engine.
//!
//! A [`Vendor`] says what its newest release is, where to download it and
//! which digest it must have. The [`Updater`] compares that against the
//! local library and, when the vendor is ahead, moves through
//! [`UpdateState::Checking`], [`UpdateState::Downloading`] and
//! [`UpdateState::Verifying`] to [`UpdateState::Replaced`].
//!
//! Downloads land in a staging file next to their destination and are
//! renamed into place only after the digest matches. Any failure, including
//! cancellation by dropping the future, leaves the library as it was.

mod batch;
mod error;
mod progress;
mod report;
mod updater;
mod vendor;

pub use batch::run_batch;
pub use error::{ErrorKind, UpdateError};
pub use progress::{NoProgress, ProgressSink};
pub use report::{Action, CheckReport, ErrorView, UpdateOutcome, UpdateState, job_label};
pub use updater::{UpdateJob, Updater};
pub use vendor::{Vendor, VendorError, VendorProfile};
