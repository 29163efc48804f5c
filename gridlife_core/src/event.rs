//! Lifecycle events streamed from the controller to the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::Cell;

/// Controller run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Rounds are being scheduled
    Executing,

    /// The turn loop is parked between rounds
    Paused,

    /// No further rounds will be scheduled; terminal
    Quitting,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Executing => "Executing",
            RunState::Paused => "Paused",
            RunState::Quitting => "Quitting",
        };
        write!(f, "{}", name)
    }
}

/// Ordered lifecycle notifications consumed by the presentation layer.
///
/// `StateChanged(Executing)` is the first event on a stream and
/// `StateChanged(Quitting)` the last before the stream closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A cell's final state differs from the initial grid
    CellChanged { turn: u32, cell: Cell },

    /// The simulation finished; carries every live cell of the final grid
    TurnComplete { turn: u32, alive: Vec<Cell> },

    /// Periodic progress report of the live-cell population
    AliveCount { turn: u32, count: usize },

    /// A grid snapshot was written
    ImageWritten { turn: u32, filename: String },

    /// The controller's run state changed
    StateChanged { turn: u32, state: RunState },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::CellChanged { turn, cell } => {
                write!(f, "turn {}: cell {} changed", turn, cell)
            }
            Event::TurnComplete { turn, alive } => {
                write!(f, "turn {}: complete, {} cells alive", turn, alive.len())
            }
            Event::AliveCount { turn, count } => {
                write!(f, "turn {}: {} cells alive", turn, count)
            }
            Event::ImageWritten { turn, filename } => {
                write!(f, "turn {}: wrote {}", turn, filename)
            }
            Event::StateChanged { turn, state } => {
                write!(f, "turn {}: state changed to {}", turn, state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_compact() {
        let event = Event::StateChanged {
            turn: 3,
            state: RunState::Paused,
        };
        assert_eq!(event.to_string(), "turn 3: state changed to Paused");

        let event = Event::AliveCount { turn: 7, count: 42 };
        assert_eq!(event.to_string(), "turn 7: 42 cells alive");
    }
}
