//! The turn orchestrator: authoritative run state and the cooperative event
//! loop over {simulation result, progress timer, interactive command}.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gridlife_core::{engine, grid_filename, write_grid, Event, Grid, Params, RunState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::ControllerError;
use crate::link::SimulationLink;

/// Interval between alive-cell progress reports.
const REPORT_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration for one controller run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Run parameters forwarded to the broker
    pub params: Params,

    /// Directory snapshots are written into
    pub image_dir: PathBuf,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Turn the simulation stopped at
    pub turn: u32,

    /// Live cells in the final grid
    pub alive: usize,
}

/// Drives one simulation run to completion.
///
/// The orchestrator holds the authoritative [`RunState`]. Pause and quit are
/// cooperative: they are relayed to the broker and take effect at its next
/// between-round check point; no in-flight round is ever interrupted. The
/// event stream starts with `StateChanged(Executing)` and ends with
/// `StateChanged(Quitting)`, after which the channel closes.
pub struct TurnOrchestrator<L: SimulationLink> {
    link: Arc<L>,
    config: RunConfig,
    events: mpsc::UnboundedSender<Event>,
    commands: mpsc::UnboundedReceiver<Command>,
    state: RunState,
    last_turn: u32,
    reporters: Vec<JoinHandle<()>>,
}

impl<L: SimulationLink> TurnOrchestrator<L> {
    pub fn new(
        link: Arc<L>,
        config: RunConfig,
        events: mpsc::UnboundedSender<Event>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            link,
            config,
            events,
            commands,
            state: RunState::Executing,
            last_turn: 0,
            reporters: Vec::new(),
        }
    }

    /// Runs the simulation from `initial` to completion.
    pub async fn run(mut self, initial: Grid) -> Result<RunSummary, ControllerError> {
        self.emit(Event::StateChanged {
            turn: 0,
            state: RunState::Executing,
        });

        let mut run = {
            let link = self.link.clone();
            let params = self.config.params;
            let grid = initial.clone();
            tokio::spawn(async move { link.process_gol(params, grid).await })
        };

        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + REPORT_INTERVAL,
            REPORT_INTERVAL,
        );
        let mut commands_open = true;

        let (final_grid, final_turn) = loop {
            tokio::select! {
                result = &mut run => {
                    let outcome = result.map_err(|err| {
                        ControllerError::aborted(format!("simulation task failed: {}", err))
                    })?;
                    break outcome?;
                }
                _ = ticker.tick() => self.spawn_alive_report(),
                command = self.commands.recv(), if commands_open => match command {
                    Some(Command::TogglePause) => self.toggle_pause().await?,
                    Some(Command::Snapshot) => self.write_snapshot().await?,
                    Some(Command::Quit) => {
                        info!("quit requested; the in-flight round will finish");
                        self.link.quit().await?;
                    }
                    None => commands_open = false,
                },
            }
        };

        self.finish(&initial, final_grid, final_turn).await
    }

    /// Requests an alive-cell count off the loop, so the timer path never
    /// delays round completion or command handling.
    fn spawn_alive_report(&mut self) {
        let link = self.link.clone();
        let events = self.events.clone();
        let params = self.config.params;
        self.reporters.retain(|reporter| !reporter.is_finished());
        self.reporters.push(tokio::spawn(async move {
            match tokio::time::timeout(REPORT_INTERVAL, link.count_alive(params)).await {
                Ok(Ok((turn, count))) => {
                    let _ = events.send(Event::AliveCount { turn, count });
                }
                Ok(Err(err)) => warn!("progress report failed: {}", err),
                Err(_) => warn!("progress report timed out"),
            }
        }));
    }

    async fn toggle_pause(&mut self) -> Result<(), ControllerError> {
        match self.state {
            RunState::Executing => {
                self.link.pause().await?;
                let (turn, _) = self.link.count_alive(self.config.params).await?;
                self.last_turn = turn;
                self.state = RunState::Paused;
                info!("paused around turn {}", turn);
                self.emit(Event::StateChanged {
                    turn,
                    state: RunState::Paused,
                });
            }
            RunState::Paused => {
                self.link.resume().await?;
                self.state = RunState::Executing;
                info!("resumed at turn {}", self.last_turn);
                self.emit(Event::StateChanged {
                    turn: self.last_turn,
                    state: RunState::Executing,
                });
            }
            RunState::Quitting => {}
        }
        Ok(())
    }

    /// Writes the broker's current grid; valid while Executing or Paused and
    /// changes neither the run state nor the turn counter.
    async fn write_snapshot(&mut self) -> Result<(), ControllerError> {
        let (grid, turn) = self.link.fetch_grid().await?;
        let filename = grid_filename(grid.width(), grid.height(), Some(turn));
        let path = self.config.image_dir.join(&filename);
        write_grid(&path, &grid)?;
        self.last_turn = turn;
        info!("snapshot written to {}", path.display());
        self.emit(Event::ImageWritten { turn, filename });
        Ok(())
    }

    /// Terminal sequence: cell diffs, final summary, final image, then
    /// `StateChanged(Quitting)` and stream close.
    async fn finish(
        mut self,
        initial: &Grid,
        final_grid: Grid,
        turn: u32,
    ) -> Result<RunSummary, ControllerError> {
        // drain in-flight progress reporters so nothing lands after the
        // terminal StateChanged
        for reporter in self.reporters.drain(..) {
            let _ = reporter.await;
        }

        for cell in final_grid.diff(initial) {
            self.emit(Event::CellChanged { turn, cell });
        }

        let alive = engine::alive_cells(&final_grid);
        let alive_count = alive.len();
        self.emit(Event::TurnComplete { turn, alive });

        let filename = grid_filename(final_grid.width(), final_grid.height(), Some(turn));
        let path = self.config.image_dir.join(&filename);
        write_grid(&path, &final_grid)?;
        info!("final grid written to {}", path.display());
        self.emit(Event::ImageWritten { turn, filename });

        self.state = RunState::Quitting;
        self.emit(Event::StateChanged {
            turn,
            state: RunState::Quitting,
        });
        info!("run complete at turn {}: {} cells alive", turn, alive_count);

        // dropping self closes the event stream
        Ok(RunSummary {
            turn,
            alive: alive_count,
        })
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("event stream consumer is gone");
        }
    }
}
