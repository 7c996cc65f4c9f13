//! HTTP transfers for the image library.
//!
//! [`Fetcher`] streams a download into an [`isoshelf_fs::StagedFile`] and
//! fetches the small documents vendors publish (index pages and checksum
//! manifests). The transport is abstracted behind [`HttpClient`]; the
//! `reqwest` feature provides [`ReqwestClient`].

mod data;
mod error;
mod fetcher;
mod http;

pub use data::{FetchPhase, Progress, ProgressCallback, Timeouts};
pub use error::{FetchError, Result};
pub use fetcher::Fetcher;
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{Body, BoxStream, HttpClient};
