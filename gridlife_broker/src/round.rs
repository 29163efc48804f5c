//! Round execution: one job per band, replies merged in enqueue order.

use std::sync::Arc;

use gridlife_core::{row_bands, Grid, Params};
use tokio::sync::oneshot;

use crate::error::BrokerError;
use crate::queue::{JobQueue, PartitionJob};

/// Runs one full round against `grid`, returning the merged next grid.
///
/// Replies are awaited strictly in enqueue order. Each reply channel
/// corresponds 1:1 to its band, so the merge is deterministic no matter
/// which worker finishes first and no reordering step exists. Blocks until
/// every band of the round has been computed.
pub async fn run_round(
    queue: &JobQueue,
    params: &Params,
    grid: &Grid,
) -> Result<Grid, BrokerError> {
    let snapshot = Arc::new(grid.clone());
    let bands = row_bands(params.height, params.threads);
    let mut replies = Vec::with_capacity(bands.len());

    for (y1, y2) in bands {
        let (tx, rx) = oneshot::channel();
        queue
            .push(PartitionJob {
                params: *params,
                y1,
                y2,
                grid: snapshot.clone(),
                reply: tx,
            })
            .await?;
        replies.push((y1, y2, rx));
    }

    let mut next = Grid::dead(params.width, params.height);
    for (y1, y2, rx) in replies {
        let slice = rx.await.map_err(|_| {
            BrokerError::aborted(format!("reply channel for rows {}..={} closed", y1, y2))
        })?;
        if slice.y1 != y1 || slice.y2 != y2 {
            return Err(BrokerError::shape(format!(
                "slice for rows {}..={} came back as rows {}..={}",
                y1, y2, slice.y1, slice.y2
            )));
        }
        next.splice(&slice)?;
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{dispatch_loop, WorkerLink};
    use async_trait::async_trait;
    use gridlife_core::{engine, GridSlice, ALIVE};
    use gridlife_net::NetError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-process link computing slices with the core engine.
    struct EngineLink {
        pub delay: Duration,
        pub served: AtomicUsize,
    }

    impl EngineLink {
        pub fn new(delay: Duration) -> Self {
            Self {
                delay,
                served: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WorkerLink for EngineLink {
        async fn process_slice(
            &self,
            _params: Params,
            y1: usize,
            y2: usize,
            grid: &Grid,
        ) -> Result<GridSlice, NetError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.served.fetch_add(1, Ordering::SeqCst);
            Ok(engine::next_slice(grid, y1, y2))
        }
    }

    /// Link that fails its first `failures` calls, then delegates.
    struct FlakyLink {
        inner: EngineLink,
        remaining_failures: AtomicUsize,
        pub failed: AtomicUsize,
    }

    impl FlakyLink {
        pub fn new(failures: usize) -> Self {
            Self {
                inner: EngineLink::new(Duration::ZERO),
                remaining_failures: AtomicUsize::new(failures),
                failed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WorkerLink for FlakyLink {
        async fn process_slice(
            &self,
            params: Params,
            y1: usize,
            y2: usize,
            grid: &Grid,
        ) -> Result<GridSlice, NetError> {
            let remaining = self.remaining_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
                self.failed.fetch_add(1, Ordering::SeqCst);
                return Err(NetError::ConnectionClosed);
            }
            self.inner.process_slice(params, y1, y2, grid).await
        }
    }

    fn glider_grid() -> Grid {
        let mut grid = Grid::dead(16, 16);
        for (x, y) in [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
            grid.set(x, y, ALIVE);
        }
        grid
    }

    fn params(threads: usize) -> Params {
        Params {
            turns: 1,
            threads,
            width: 16,
            height: 16,
        }
    }

    #[tokio::test]
    async fn test_round_matches_one_pass_step() {
        let queue = JobQueue::new();
        tokio::spawn(dispatch_loop(
            queue.clone(),
            Arc::new(EngineLink::new(Duration::ZERO)),
            "local".to_string(),
        ));

        let grid = glider_grid();
        let merged = run_round(&queue, &params(4), &grid).await.unwrap();
        assert_eq!(merged, engine::step(&grid));
    }

    #[tokio::test]
    async fn test_merge_is_deterministic_across_worker_speeds() {
        let queue = JobQueue::new();
        // one fast and one slow worker competing for the same round
        tokio::spawn(dispatch_loop(
            queue.clone(),
            Arc::new(EngineLink::new(Duration::ZERO)),
            "fast".to_string(),
        ));
        tokio::spawn(dispatch_loop(
            queue.clone(),
            Arc::new(EngineLink::new(Duration::from_millis(30))),
            "slow".to_string(),
        ));

        let grid = glider_grid();
        let merged = run_round(&queue, &params(5), &grid).await.unwrap();
        assert_eq!(merged, engine::step(&grid));
    }

    #[tokio::test]
    async fn test_failed_dispatch_completes_exactly_once() {
        let queue = JobQueue::new();
        let healthy = Arc::new(EngineLink::new(Duration::ZERO));
        let flaky = Arc::new(FlakyLink::new(1));
        tokio::spawn(dispatch_loop(
            queue.clone(),
            healthy.clone(),
            "healthy".to_string(),
        ));
        tokio::spawn(dispatch_loop(queue.clone(), flaky.clone(), "flaky".to_string()));

        let grid = glider_grid();
        let merged = run_round(&queue, &params(4), &grid).await.unwrap();

        // the failed partition was retried and the result matches the
        // no-failure computation
        assert_eq!(merged, engine::step(&grid));
        let successes =
            healthy.served.load(Ordering::SeqCst) + flaky.inner.served.load(Ordering::SeqCst);
        assert_eq!(successes, 4);
        assert_eq!(flaky.failed.load(Ordering::SeqCst), 1);
    }
}
