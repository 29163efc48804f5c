//! World state and the between-round control flags.

use std::sync::Mutex;

use gridlife_core::{engine, Grid};
use tokio::sync::Notify;

/// The authoritative grid and turn counter.
///
/// The turn loop is the single writer; the lock exists for the read paths
/// (progress counts, snapshot fetches) that run decoupled from the loop.
/// The counter only ever changes together with a fully merged grid, so no
/// partially merged state is observable.
pub struct WorldState {
    inner: Mutex<WorldInner>,
}

struct WorldInner {
    grid: Grid,
    turn: u32,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(WorldInner {
                grid: Grid::dead(0, 0),
                turn: 0,
            }),
        }
    }

    /// Installs a fresh world at turn 0.
    pub fn install(&self, grid: Grid) {
        let mut inner = self.inner.lock().unwrap();
        inner.grid = grid;
        inner.turn = 0;
    }

    /// Stores a fully merged grid and advances the turn counter by one.
    pub fn commit_round(&self, grid: Grid) -> u32 {
        let mut inner = self.inner.lock().unwrap();
        inner.grid = grid;
        inner.turn += 1;
        inner.turn
    }

    /// Copy of the current grid and turn.
    pub fn snapshot(&self) -> (Grid, u32) {
        let inner = self.inner.lock().unwrap();
        (inner.grid.clone(), inner.turn)
    }

    /// Live-cell count over the current snapshot, under the lock.
    pub fn alive_count(&self) -> (u32, usize) {
        let inner = self.inner.lock().unwrap();
        (inner.turn, engine::alive_count(&inner.grid))
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

/// Pause/quit flags observed by the turn loop between rounds.
///
/// Neither flag ever interrupts an in-flight round; both take effect at the
/// next between-round check point.
pub struct RunControl {
    flags: Mutex<Flags>,
    wake: Notify,
}

#[derive(Default)]
struct Flags {
    paused: bool,
    quit: bool,
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(Flags::default()),
            wake: Notify::new(),
        }
    }

    pub fn pause(&self) {
        self.flags.lock().unwrap().paused = true;
    }

    pub fn resume(&self) {
        self.flags.lock().unwrap().paused = false;
        self.wake.notify_waiters();
    }

    pub fn quit(&self) {
        self.flags.lock().unwrap().quit = true;
        self.wake.notify_waiters();
    }

    /// Clears both flags for a fresh simulation request.
    pub fn reset(&self) {
        let mut flags = self.flags.lock().unwrap();
        flags.paused = false;
        flags.quit = false;
    }

    /// Parks while paused. Returns `true` when the loop should stop.
    pub async fn checkpoint(&self) -> bool {
        loop {
            // register for a wakeup before checking, so a resume/quit that
            // lands between the check and the await is not lost
            let notified = self.wake.notified();
            {
                let flags = self.flags.lock().unwrap();
                if flags.quit {
                    return true;
                }
                if !flags.paused {
                    return false;
                }
            }
            notified.await;
        }
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}
