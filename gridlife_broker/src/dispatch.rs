//! Dispatch tasks: one per subscribed worker, competing on the shared queue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gridlife_core::{Grid, GridSlice, Params};
use gridlife_net::{NetError, Request, Response, RpcClient};
use tracing::{debug, warn};

use crate::queue::JobQueue;

/// Delay before a failed job is pushed back for retry.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// One worker call seam.
///
/// The production implementation speaks RPC over the connection opened at
/// subscription time; tests substitute in-process engines.
#[async_trait]
pub trait WorkerLink: Send + Sync + 'static {
    /// Computes the next state of rows `[y1..=y2]` of `grid`.
    async fn process_slice(
        &self,
        params: Params,
        y1: usize,
        y2: usize,
        grid: &Grid,
    ) -> Result<GridSlice, NetError>;
}

/// RPC-backed link over the broker's outbound connection to one worker.
pub struct RemoteWorker {
    client: RpcClient,
}

impl RemoteWorker {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkerLink for RemoteWorker {
    async fn process_slice(
        &self,
        params: Params,
        y1: usize,
        y2: usize,
        grid: &Grid,
    ) -> Result<GridSlice, NetError> {
        let request = Request::ProcessSlice {
            params,
            y1,
            y2,
            grid: grid.clone(),
        };
        match self.client.call(request).await? {
            Response::SliceResult { slice } => Ok(slice),
            Response::Error { message } => Err(NetError::remote(message)),
            other => Err(NetError::unexpected(other.name())),
        }
    }
}

/// Pulls jobs until the queue closes.
///
/// A failed call re-queues the job, reply channel intact, for any live
/// dispatch task to retry; retries are unbounded and there is no dead-worker
/// detection. The short delay keeps a dead connection from spinning the
/// queue.
pub async fn dispatch_loop(queue: JobQueue, link: Arc<dyn WorkerLink>, worker_addr: String) {
    while let Some(job) = queue.pop().await {
        match link
            .process_slice(job.params, job.y1, job.y2, job.grid.as_ref())
            .await
        {
            Ok(slice) => {
                if job.reply.send(slice).is_err() {
                    debug!("worker {}: round abandoned before reply", worker_addr);
                }
            }
            Err(err) => {
                warn!(
                    "worker {}: dispatch of rows {}..={} failed, re-queueing: {}",
                    worker_addr, job.y1, job.y2, err
                );
                tokio::time::sleep(RETRY_DELAY).await;
                if queue.push(job).await.is_err() {
                    warn!("worker {}: job queue closed, job dropped", worker_addr);
                    return;
                }
            }
        }
    }
    debug!("worker {}: dispatch loop finished", worker_addr);
}
