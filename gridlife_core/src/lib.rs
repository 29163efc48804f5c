//! GridLife Core Library
//!
//! The domain vocabulary shared by the controller, broker and workers:
//! the row-major [`Grid`] model, the pure automaton [`engine`], the
//! [`row_bands`] partitioning for a round of jobs, the lifecycle [`Event`]
//! stream contract, and the PGM snapshot codec.
//!
//! Everything here is deliberately free of I/O and concurrency (the PGM
//! codec excepted), so the same kernel runs inside a remote worker, an
//! in-process test link, or a one-pass reference computation.

pub mod engine;
mod error;
mod event;
mod grid;
mod image;
mod params;
mod partition;

pub use error::CoreError;
pub use event::{Event, RunState};
pub use grid::{Cell, Grid, GridSlice, ALIVE, DEAD};
pub use image::{grid_filename, read_grid, write_grid};
pub use params::Params;
pub use partition::row_bands;
