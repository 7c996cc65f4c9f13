use std::io::SeekFrom;

use futures_util::StreamExt;
use isoshelf_fs::StagedFile;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::time::timeout;

use crate::data::{FetchPhase, Progress, ProgressCallback, Timeouts};
use crate::error::{FetchError, Result};
use crate::http::HttpClient;

/// Downloads bodies into staged files and fetches small text documents.
pub struct Fetcher<C: HttpClient> {
    client:   C,
    timeouts: Timeouts,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, timeouts: Timeouts) -> Self { Self { client, timeouts } }

    pub fn client(&self) -> &C { &self.client }

    pub fn timeouts(&self) -> &Timeouts { &self.timeouts }

    /// Fetch an index page or checksum manifest.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "fetching document");
        match timeout(self.timeouts.request, self.client.get_text(url)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(FetchError::network(url, e)),
            Err(_) => Err(FetchError::Timeout {
                url:   url.to_string(),
                after: self.timeouts.request,
            }),
        }
    }

    /// Stream `url` into `staged`, replacing whatever it held.
    ///
    /// Returns the number of bytes written. A stalled body, a broken stream,
    /// or a body shorter than its advertised length are all errors; the
    /// staged file is left for the caller to discard.
    pub async fn download(
        &self,
        url: &str,
        staged: &StagedFile,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<u64> {
        report(on_progress, FetchPhase::Connecting, 0, None);

        let body = match timeout(self.timeouts.connect, self.client.stream(url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(FetchError::network(url, e)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url:   url.to_string(),
                    after: self.timeouts.connect,
                });
            }
        };
        let total = body.content_length;
        let mut chunks = body.chunks;
        tracing::debug!(url, total_bytes = ?total, "response received");

        let path = staged.path();
        let write_err = |source| FetchError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::from_std(staged.reopen().map_err(write_err)?);
        file.set_len(0).await.map_err(write_err)?;
        file.seek(SeekFrom::Start(0)).await.map_err(write_err)?;

        let mut received = 0u64;
        report(on_progress, FetchPhase::Downloading, received, total);
        loop {
            let next = timeout(self.timeouts.read, chunks.next())
                .await
                .map_err(|_| FetchError::Timeout {
                    url:   url.to_string(),
                    after: self.timeouts.read,
                })?;
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| FetchError::network(url, e))?;

            file.write_all(&chunk).await.map_err(write_err)?;
            received += chunk.len() as u64;
            report(on_progress, FetchPhase::Downloading, received, total);
        }

        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;

        match total {
            Some(expected) if expected != received => {
                return Err(FetchError::Incomplete {
                    url: url.to_string(),
                    expected,
                    received,
                });
            }
            _ => {}
        }

        report(on_progress, FetchPhase::Completed, received, total.or(Some(received)));
        tracing::debug!(url, bytes = received, "download finished");
        Ok(received)
    }
}

fn report(on_progress: Option<&ProgressCallback>, phase: FetchPhase, bytes_downloaded: u64, total_bytes: Option<u64>) {
    if let Some(callback) = on_progress {
        callback(&Progress {
            phase,
            bytes_downloaded,
            total_bytes,
        });
    }
}
