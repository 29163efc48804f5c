//! The broker service: subscription, the turn loop, and progress reads.

use std::sync::Arc;

use async_trait::async_trait;
use gridlife_core::{Grid, Params};
use gridlife_net::{NetError, Request, Response, RpcClient, RpcService};
use tracing::{debug, info, warn};

use crate::dispatch::{dispatch_loop, RemoteWorker, WorkerLink};
use crate::error::BrokerError;
use crate::queue::JobQueue;
use crate::round::run_round;
use crate::state::{RunControl, WorldState};

/// Coordinates the worker pool and owns the simulation turn loop.
pub struct Broker {
    jobs: JobQueue,
    world: WorldState,
    control: RunControl,
    workers: std::sync::Mutex<Vec<String>>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            jobs: JobQueue::new(),
            world: WorldState::new(),
            control: RunControl::new(),
            workers: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Registers a worker: dials its address back and starts a dispatch task
    /// on the resulting connection. The handle lives for the process
    /// lifetime; there is no teardown on disconnect.
    pub async fn subscribe(&self, worker_addr: &str) -> Result<(), NetError> {
        let client = RpcClient::connect(worker_addr).await?;
        self.attach_link(Arc::new(RemoteWorker::new(client)), worker_addr);
        info!("worker subscribed: {}", worker_addr);
        Ok(())
    }

    /// Starts a dispatch task over any worker link. Used by `subscribe` and
    /// by in-process setups.
    pub fn attach_link(&self, link: Arc<dyn WorkerLink>, name: &str) {
        self.workers.lock().unwrap().push(name.to_string());
        tokio::spawn(dispatch_loop(self.jobs.clone(), link, name.to_string()));
    }

    /// Addresses of every subscribed worker, in subscription order.
    pub fn worker_addrs(&self) -> Vec<String> {
        self.workers.lock().unwrap().clone()
    }

    /// Runs the whole simulation request: `turns` rounds with a pause/quit
    /// check point between rounds.
    ///
    /// The request grid is installed as the world state at turn 0; each
    /// merged round is stored atomically with its turn, so reads during the
    /// run only ever see fully merged states.
    pub async fn process_gol(&self, params: Params, grid: Grid) -> Result<(Grid, u32), BrokerError> {
        if grid.width() != params.width || grid.height() != params.height {
            return Err(BrokerError::shape(format!(
                "request grid is {}x{} but params say {}x{}",
                grid.width(),
                grid.height(),
                params.width,
                params.height
            )));
        }

        info!(
            "simulation started: {}x{}, {} turns, {} partitions, {} workers",
            params.width,
            params.height,
            params.turns,
            params.threads,
            self.worker_addrs().len()
        );
        self.control.reset();
        self.world.install(grid);

        for _ in 0..params.turns {
            if self.control.checkpoint().await {
                info!("quit requested, stopping after a fully merged round");
                break;
            }
            let (current, _) = self.world.snapshot();
            let next = run_round(&self.jobs, &params, &current).await?;
            let turn = self.world.commit_round(next);
            debug!("turn {} merged", turn);
        }

        let (final_grid, turn) = self.world.snapshot();
        info!("simulation finished at turn {}", turn);
        Ok((final_grid, turn))
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcService for Broker {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Subscribe { worker_addr } => match self.subscribe(&worker_addr).await {
                Ok(()) => Response::Ack {
                    message: format!("subscribed {}", worker_addr),
                },
                Err(err) => {
                    warn!("subscription of {} failed: {}", worker_addr, err);
                    Response::Error {
                        message: err.to_string(),
                    }
                }
            },
            Request::ProcessGol { params, grid } => match self.process_gol(params, grid).await {
                Ok((grid, turn)) => Response::GolResult { grid, turn },
                Err(err) => {
                    warn!("simulation failed: {}", err);
                    Response::Error {
                        message: err.to_string(),
                    }
                }
            },
            Request::CountAliveCells { .. } => {
                let (turn, alive_count) = self.world.alive_count();
                Response::AliveCount { turn, alive_count }
            }
            Request::Pause => {
                self.control.pause();
                info!("pause requested, takes effect after the in-flight round");
                Response::Ack {
                    message: "paused".to_string(),
                }
            }
            Request::Resume => {
                self.control.resume();
                info!("resumed");
                Response::Ack {
                    message: "resumed".to_string(),
                }
            }
            Request::Quit => {
                self.control.quit();
                Response::Ack {
                    message: "quitting".to_string(),
                }
            }
            Request::FetchGrid => {
                let (grid, turn) = self.world.snapshot();
                Response::GridSnapshot { grid, turn }
            }
            other => Response::Error {
                message: format!("broker does not serve {}", other.name()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlife_core::{engine, GridSlice, ALIVE};
    use std::time::Duration;

    /// In-process link with a per-call delay so runs take observable time.
    struct EngineLink {
        delay: Duration,
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
            Ok(engine::next_slice(grid, y1, y2))
        }
    }

    fn broker_with_workers(count: usize, delay: Duration) -> Arc<Broker> {
        let broker = Arc::new(Broker::new());
        for i in 0..count {
            broker.attach_link(Arc::new(EngineLink { delay }), &format!("local-{}", i));
        }
        broker
    }

    fn glider_grid() -> Grid {
        let mut grid = Grid::dead(16, 16);
        for (x, y) in [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
            grid.set(x, y, ALIVE);
        }
        grid
    }

    fn reference(grid: &Grid, turns: u32) -> Grid {
        let mut current = grid.clone();
        for _ in 0..turns {
            current = engine::step(&current);
        }
        current
    }

    #[tokio::test]
    async fn test_process_gol_matches_serial_reference() {
        let broker = broker_with_workers(2, Duration::ZERO);
        let params = Params {
            turns: 4,
            threads: 4,
            width: 16,
            height: 16,
        };
        let (grid, turn) = broker.process_gol(params, glider_grid()).await.unwrap();
        assert_eq!(turn, 4);
        assert_eq!(grid, reference(&glider_grid(), 4));
        assert_eq!(engine::alive_count(&grid), 5);
    }

    #[tokio::test]
    async fn test_process_gol_rejects_shape_mismatch() {
        let broker = broker_with_workers(1, Duration::ZERO);
        let params = Params {
            turns: 1,
            threads: 1,
            width: 8,
            height: 8,
        };
        let result = broker.process_gol(params, Grid::dead(16, 16)).await;
        assert!(matches!(result, Err(BrokerError::ShapeMismatch(_))));
    }

    #[tokio::test]
    async fn test_pause_freezes_and_resume_loses_no_turns() {
        let broker = broker_with_workers(2, Duration::from_millis(2));
        let params = Params {
            turns: 20,
            threads: 2,
            width: 16,
            height: 16,
        };

        let run = {
            let broker = broker.clone();
            tokio::spawn(async move { broker.process_gol(params, glider_grid()).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        broker.control.pause();
        // the in-flight round finishes, then the counter freezes
        tokio::time::sleep(Duration::from_millis(40)).await;
        let (frozen_turn, _) = broker.world.alive_count();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(broker.world.alive_count().0, frozen_turn);

        broker.control.resume();
        let (grid, turn) = run.await.unwrap().unwrap();
        assert_eq!(turn, 20);
        assert_eq!(grid, reference(&glider_grid(), 20));
    }

    #[tokio::test]
    async fn test_quit_stops_early_at_a_merged_round() {
        let broker = broker_with_workers(1, Duration::from_millis(2));
        let params = Params {
            turns: 100_000,
            threads: 2,
            width: 16,
            height: 16,
        };

        let run = {
            let broker = broker.clone();
            tokio::spawn(async move { broker.process_gol(params, glider_grid()).await })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        broker.control.quit();
        let (grid, turn) = run.await.unwrap().unwrap();

        assert!(turn < params.turns);
        // whatever turn it stopped at, the grid is that turn exactly
        assert_eq!(grid, reference(&glider_grid(), turn));
    }

    #[tokio::test]
    async fn test_count_alive_cells_reads_current_snapshot() {
        let broker = broker_with_workers(1, Duration::ZERO);
        let params = Params {
            turns: 2,
            threads: 2,
            width: 16,
            height: 16,
        };
        broker.process_gol(params, glider_grid()).await.unwrap();

        let response = broker
            .handle(Request::CountAliveCells { params })
            .await;
        assert_eq!(
            response,
            Response::AliveCount {
                turn: 2,
                alive_count: 5
            }
        );
    }
}
