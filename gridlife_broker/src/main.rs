//! GridLife broker binary.
//!
//! Accepts controller and worker sessions on one port: workers subscribe,
//! controllers submit simulation requests.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gridlife_broker::Broker;
use gridlife_net::serve;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// GridLife job broker
#[derive(Parser, Debug)]
#[command(name = "gridlife-broker")]
#[command(about = "Coordinates GridLife workers and serves simulation requests", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8030")]
    port: u16,

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

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("broker listening on port {}", args.port);

    let broker = Arc::new(Broker::new());
    serve(listener, broker).await?;
    Ok(())
}
