//! GridLife worker binary.
//!
//! A remote-callable wrapper around the grid engine: binds its listener,
//! then performs a one-time subscription call to the broker carrying its
//! own reachable address. Subscription failure is fatal; failure of an
//! individual slice call is the broker's concern.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Parser;
use gridlife_core::engine;
use gridlife_net::{serve, Request, Response, RpcClient, RpcService};
use tokio::net::TcpListener;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Stateless slice computation service.
struct SliceService;

#[async_trait]
impl RpcService for SliceService {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::ProcessSlice {
                params: _,
                y1,
                y2,
                grid,
            } => {
                debug!("computing rows {}..={}", y1, y2);
                let slice = engine::next_slice(&grid, y1, y2);
                Response::SliceResult { slice }
            }
            other => Response::Error {
                message: format!("worker does not serve {}", other.name()),
            },
        }
    }
}

/// GridLife slice worker
#[derive(Parser, Debug)]
#[command(name = "gridlife-worker")]
#[command(about = "Computes grid slices on behalf of the broker", long_about = None)]
struct Args {
    /// Address to listen on, as reachable from the broker
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Address of the broker instance
    #[arg(short, long, default_value = "127.0.0.1:8030")]
    broker: String,

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

    // listen before subscribing: the broker dials back immediately
    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to bind listener on {}", args.listen))?;
    info!("worker listening on {}", args.listen);
    let server = tokio::spawn(serve(listener, Arc::new(SliceService)));

    let broker = RpcClient::connect(&args.broker)
        .await
        .with_context(|| format!("failed to dial broker at {}", args.broker))?;
    info!("dialed broker at {}", broker.peer());
    let subscription = Request::Subscribe {
        worker_addr: args.listen.clone(),
    };
    match broker.call(subscription).await? {
        Response::Ack { message } => info!("subscribed to broker: {}", message),
        Response::Error { message } => bail!("broker rejected subscription: {}", message),
        other => bail!("unexpected subscription response: {}", other.name()),
    }

    server.await??;
    Ok(())
}
