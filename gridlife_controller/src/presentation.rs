//! Headless presentation layer: renders the event stream through tracing.

use gridlife_core::Event;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Consumes the event stream until it closes.
///
/// Per-cell change notifications are demoted to debug; everything else is
/// user-facing progress.
pub fn spawn_event_printer(mut events: mpsc::UnboundedReceiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                Event::CellChanged { .. } => debug!("{}", event),
                _ => info!("{}", event),
            }
        }
        debug!("event stream closed");
    })
}
