//! Wire messages exchanged between controller, broker and workers.

use gridlife_core::{Grid, GridSlice, Params};
use serde::{Deserialize, Serialize};

/// A framed wire message. Responses echo the request `id`; ids only need to
/// be unique per session, so each client numbers its own calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub id: u64,
    pub body: T,
}

/// Requests understood by the broker and worker services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Register a worker; the broker dials `worker_addr` back and starts a
    /// dispatch task on the resulting connection
    Subscribe { worker_addr: String },

    /// Run the whole simulation; returns the final grid and turn, early if
    /// a quit arrives at a between-round check point
    ProcessGol { params: Params, grid: Grid },

    /// Count live cells over the broker's current snapshot
    CountAliveCells { params: Params },

    /// Compute the next state of rows `[y1..=y2]` (broker to worker)
    ProcessSlice {
        params: Params,
        y1: usize,
        y2: usize,
        grid: Grid,
    },

    /// Park the turn loop at the next between-round check point
    Pause,

    /// Wake a paused turn loop
    Resume,

    /// Stop scheduling further rounds; the in-flight round completes
    Quit,

    /// Read-only copy of the current grid and turn
    FetchGrid,
}

impl Request {
    /// Short operation name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Subscribe { .. } => "Subscribe",
            Request::ProcessGol { .. } => "ProcessGol",
            Request::CountAliveCells { .. } => "CountAliveCells",
            Request::ProcessSlice { .. } => "ProcessSlice",
            Request::Pause => "Pause",
            Request::Resume => "Resume",
            Request::Quit => "Quit",
            Request::FetchGrid => "FetchGrid",
        }
    }
}

/// Responses paired to [`Request`]s by envelope id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Generic acknowledgement
    Ack { message: String },

    /// Final grid and turn from `ProcessGol`
    GolResult { grid: Grid, turn: u32 },

    /// Progress counts from `CountAliveCells`
    AliveCount { turn: u32, alive_count: usize },

    /// Next-state rows from `ProcessSlice`
    SliceResult { slice: GridSlice },

    /// Current state from `FetchGrid`
    GridSnapshot { grid: Grid, turn: u32 },

    /// The request could not be served
    Error { message: String },
}

impl Response {
    /// Short response name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Response::Ack { .. } => "Ack",
            Response::GolResult { .. } => "GolResult",
            Response::AliveCount { .. } => "AliveCount",
            Response::SliceResult { .. } => "SliceResult",
            Response::GridSnapshot { .. } => "GridSnapshot",
            Response::Error { .. } => "Error",
        }
    }
}
