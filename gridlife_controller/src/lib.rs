//! GridLife Controller Library
//!
//! The controller owns the authoritative run state machine. It drives one
//! simulation per process: a single cooperative event loop waits on the
//! simulation result, a periodic progress timer and the interactive command
//! source, and streams ordered lifecycle events to the presentation layer.

mod command;
mod error;
mod link;
mod orchestrator;
mod presentation;

pub use command::{spawn_stdin_commands, Command};
pub use error::ControllerError;
pub use link::{RemoteBroker, SimulationLink};
pub use orchestrator::{RunConfig, RunSummary, TurnOrchestrator};
pub use presentation::spawn_event_printer;
