use std::future::Future;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::Semaphore;

/// Run `run` over `jobs` with at most `workers` in flight.
///
/// Results are returned in job order regardless of completion order.
pub async fn run_batch<'a, J, T, F, Fut>(jobs: &'a [J], workers: usize, run: F) -> Vec<T>
where
    F: Fn(&'a J) -> Fut,
    Fut: Future<Output = T>,
{
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut pending = FuturesUnordered::new();

    for (index, job) in jobs.iter().enumerate() {
        let semaphore = semaphore.clone();
        let work = run(job);
        pending.push(async move {
            // The semaphore is never closed, so acquiring cannot fail.
            let _permit = semaphore.acquire_owned().await;
            (index, work.await)
        });
    }

    let mut done = Vec::with_capacity(jobs.len());
    while let Some(result) = pending.next().await {
        done.push(result);
    }
    done.sort_by_key(|(index, _)| *index);
    done.into_iter().map(|(_, result)| result).collect()
}
