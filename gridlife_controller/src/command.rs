//! Interactive command source.

use tokio::sync::mpsc;
use tracing::debug;

/// Single discrete control commands accepted while a run is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Toggle between Executing and Paused
    TogglePause,

    /// Write a snapshot of the current grid
    Snapshot,

    /// Finish the in-flight round, then stop
    Quit,
}

/// Spawns a blocking stdin reader translating lines into commands:
/// `p` toggles pause, `s` snapshots, `q` quits. Unknown input is ignored.
///
/// The channel closes on EOF; the orchestrator then simply runs to
/// completion without interactive control.
pub fn spawn_stdin_commands() -> mpsc::UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            let command = match line.trim() {
                "p" => Command::TogglePause,
                "s" => Command::Snapshot,
                "q" => Command::Quit,
                "" => continue,
                other => {
                    debug!("ignoring unknown command {:?}", other);
                    continue;
                }
            };
            if tx.send(command).is_err() {
                return;
            }
        }
    });
    rx
}
