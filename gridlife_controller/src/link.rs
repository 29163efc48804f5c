//! The controller's seam to the simulation tier.

use async_trait::async_trait;
use gridlife_core::{Grid, Params};
use gridlife_net::{NetError, Request, Response, RpcClient};

/// Operations the orchestrator needs from the broker.
///
/// The production implementation is RPC-backed; tests drive the state
/// machine with an in-process implementation.
#[async_trait]
pub trait SimulationLink: Send + Sync + 'static {
    /// Runs the whole simulation, returning the final grid and turn.
    async fn process_gol(&self, params: Params, grid: Grid) -> Result<(Grid, u32), NetError>;

    /// Progress count over the broker's current snapshot.
    async fn count_alive(&self, params: Params) -> Result<(u32, usize), NetError>;

    /// Parks the broker's turn loop at its next between-round check point.
    async fn pause(&self) -> Result<(), NetError>;

    /// Wakes a paused turn loop.
    async fn resume(&self) -> Result<(), NetError>;

    /// Asks the broker to stop scheduling further rounds.
    async fn quit(&self) -> Result<(), NetError>;

    /// Read-only copy of the current grid and turn.
    async fn fetch_grid(&self) -> Result<(Grid, u32), NetError>;
}

/// RPC-backed link to a remote broker.
///
/// All calls share one session; the long-running `process_gol` call and the
/// periodic progress calls are multiplexed by the client.
pub struct RemoteBroker {
    client: RpcClient,
}

impl RemoteBroker {
    pub async fn connect(addr: &str) -> Result<Self, NetError> {
        Ok(Self {
            client: RpcClient::connect(addr).await?,
        })
    }

    async fn expect_ack(&self, request: Request) -> Result<(), NetError> {
        match self.client.call(request).await? {
            Response::Ack { .. } => Ok(()),
            Response::Error { message } => Err(NetError::remote(message)),
            other => Err(NetError::unexpected(other.name())),
        }
    }
}

#[async_trait]
impl SimulationLink for RemoteBroker {
    async fn process_gol(&self, params: Params, grid: Grid) -> Result<(Grid, u32), NetError> {
        match self.client.call(Request::ProcessGol { params, grid }).await? {
            Response::GolResult { grid, turn } => Ok((grid, turn)),
            Response::Error { message } => Err(NetError::remote(message)),
            other => Err(NetError::unexpected(other.name())),
        }
    }

    async fn count_alive(&self, params: Params) -> Result<(u32, usize), NetError> {
        match self.client.call(Request::CountAliveCells { params }).await? {
            Response::AliveCount { turn, alive_count } => Ok((turn, alive_count)),
            Response::Error { message } => Err(NetError::remote(message)),
            other => Err(NetError::unexpected(other.name())),
        }
    }

    async fn pause(&self) -> Result<(), NetError> {
        self.expect_ack(Request::Pause).await
    }

    async fn resume(&self) -> Result<(), NetError> {
        self.expect_ack(Request::Resume).await
    }

    async fn quit(&self) -> Result<(), NetError> {
        self.expect_ack(Request::Quit).await
    }

    async fn fetch_grid(&self) -> Result<(Grid, u32), NetError> {
        match self.client.call(Request::FetchGrid).await? {
            Response::GridSnapshot { grid, turn } => Ok((grid, turn)),
            Response::Error { message } => Err(NetError::remote(message)),
            other => Err(NetError::unexpected(other.name())),
        }
    }
}
