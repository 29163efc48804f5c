//! Run parameters carried on every simulation request and partition job.

use serde::{Deserialize, Serialize};

/// Parameters of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Number of turns to simulate
    pub turns: u32,

    /// Number of row partitions per round
    pub threads: usize,

    /// Grid width in cells
    pub width: usize,

    /// Grid height in cells
    pub height: usize,
}
