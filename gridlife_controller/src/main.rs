//! GridLife controller binary.
//!
//! Reads the initial grid, drives the run against the broker, and renders
//! lifecycle events. Interactive controls on stdin: `p` pause/resume,
//! `s` snapshot, `q` quit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gridlife_controller::{
    spawn_event_printer, spawn_stdin_commands, RemoteBroker, RunConfig, TurnOrchestrator,
};
use gridlife_core::{grid_filename, read_grid, Params};
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// GridLife run controller
#[derive(Parser, Debug)]
#[command(name = "gridlife-controller")]
#[command(about = "Drives a GridLife simulation and streams lifecycle events", long_about = None)]
struct Args {
    /// Address of the broker instance
    #[arg(short, long, default_value = "127.0.0.1:8030")]
    broker: String,

    /// Number of turns to simulate
    #[arg(short, long, default_value = "100")]
    turns: u32,

    /// Number of row partitions per round
    #[arg(short = 'T', long, default_value = "4")]
    threads: usize,

    /// Grid width in cells
    #[arg(short = 'W', long, default_value = "16")]
    width: usize,

    /// Grid height in cells
    #[arg(short = 'H', long, default_value = "16")]
    height: usize,

    /// Directory grid images are read from and written to
    #[arg(short, long, default_value = "images")]
    image_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let params = Params {
        turns: args.turns,
        threads: args.threads,
        width: args.width,
        height: args.height,
    };

    let input = args
        .image_dir
        .join(grid_filename(args.width, args.height, None));
    let initial = read_grid(&input)
        .with_context(|| format!("failed to read initial grid {}", input.display()))?;

    let link = RemoteBroker::connect(&args.broker)
        .await
        .with_context(|| format!("failed to connect to broker at {}", args.broker))?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = spawn_event_printer(event_rx);
    let commands = spawn_stdin_commands();
    info!("controls: p = pause/resume, s = snapshot, q = quit");

    let orchestrator = TurnOrchestrator::new(
        Arc::new(link),
        RunConfig {
            params,
            image_dir: args.image_dir,
        },
        event_tx,
        commands,
    );
    let summary = orchestrator.run(initial).await?;

    // the orchestrator closed the stream; let the printer drain it
    printer.await?;
    info!(
        "controller done: turn {}, {} cells alive",
        summary.turn, summary.alive
    );
    Ok(())
}
