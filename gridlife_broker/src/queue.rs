//! The shared bounded job queue dispatch tasks compete on.

use std::sync::Arc;

use gridlife_core::{Grid, GridSlice, Params};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::error::BrokerError;

/// Queue capacity. Producers block when the queue is full, which gives
/// natural backpressure on round issue.
pub const QUEUE_CAPACITY: usize = 16;

/// One partition of one round.
///
/// Immutable once created and consumed exactly once: the reply channel can
/// only ever deliver a single slice. A job whose dispatch fails is pushed
/// back whole, reply channel included, for another dispatch task to retry.
#[derive(Debug)]
pub struct PartitionJob {
    /// Run parameters of the owning round
    pub params: Params,

    /// First row of the band, inclusive
    pub y1: usize,

    /// Last row of the band, inclusive
    pub y2: usize,

    /// Read-only snapshot of the current grid, shared across the round
    pub grid: Arc<Grid>,

    /// Where the next-state rows are delivered
    pub reply: oneshot::Sender<GridSlice>,
}

/// Bounded multi-producer queue whose single receiver is shared by every
/// dispatch task.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<PartitionJob>,
    rx: Arc<Mutex<mpsc::Receiver<PartitionJob>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Enqueues a job, waiting while the queue is full.
    pub async fn push(&self, job: PartitionJob) -> Result<(), BrokerError> {
        self.tx
            .send(job)
            .await
            .map_err(|_| BrokerError::aborted("job queue closed".to_string()))
    }

    /// Takes the next job; contended fairly across callers via the shared
    /// receiver lock. Returns `None` once the queue is closed and drained.
    pub async fn pop(&self) -> Option<PartitionJob> {
        self.rx.lock().await.recv().await
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(y1: usize, y2: usize) -> (PartitionJob, oneshot::Receiver<GridSlice>) {
        let (tx, rx) = oneshot::channel();
        let params = Params {
            turns: 1,
            threads: 1,
            width: 4,
            height: 4,
        };
        (
            PartitionJob {
                params,
                y1,
                y2,
                grid: Arc::new(Grid::dead(4, 4)),
                reply: tx,
            },
            rx,
        )
    }

    #[tokio::test]
    async fn test_fifo_for_a_single_consumer() {
        let queue = JobQueue::new();
        let (first, _rx1) = job(0, 1);
        let (second, _rx2) = job(2, 3);
        queue.push(first).await.unwrap();
        queue.push(second).await.unwrap();

        assert_eq!(queue.pop().await.unwrap().y1, 0);
        assert_eq!(queue.pop().await.unwrap().y1, 2);
    }

    #[tokio::test]
    async fn test_competing_consumers_each_job_taken_once() {
        let queue = JobQueue::new();
        let mut receivers = Vec::new();
        for band in 0..8 {
            let (job, rx) = job(band, band);
            queue.push(job).await.unwrap();
            receivers.push(rx);
        }

        // two competing consumers answer every job with a marker slice
        for _ in 0..2 {
            let queue = queue.clone();
            tokio::spawn(async move {
                while let Some(job) = queue.pop().await {
                    let _ = job.reply.send(GridSlice {
                        y1: job.y1,
                        y2: job.y2,
                        width: job.params.width,
                        cells: vec![0; job.params.width],
                    });
                }
            });
        }

        for (band, rx) in receivers.into_iter().enumerate() {
            let slice = rx.await.unwrap();
            assert_eq!(slice.y1, band);
        }
    }
}
