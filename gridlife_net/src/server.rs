//! Connection-serving RPC loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::codec::{read_frame, write_frame};
use crate::error::NetError;
use crate::message::{Envelope, Request, Response};

/// Handles one decoded request.
///
/// Implementations are shared across connections and invoked concurrently;
/// a handler may run for a long time (the broker's `ProcessGol` runs whole
/// simulations) without stalling its session.
#[async_trait]
pub trait RpcService: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> Response;
}

/// Accepts connections forever, serving `service` on each.
pub async fn serve(listener: TcpListener, service: Arc<dyn RpcService>) -> Result<(), NetError> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!("accepted connection from {}", addr);
        tokio::spawn(serve_connection(stream, service.clone()));
    }
}

/// Reads requests off one session until it closes.
///
/// Each request is handled in its own task and the write half is shared
/// behind a mutex, so responses go out whenever their handler finishes,
/// correlated by envelope id rather than by order.
async fn serve_connection(stream: TcpStream, service: Arc<dyn RpcService>) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let (mut reader, write_half) = stream.into_split();
    let writer = Arc::new(Mutex::new(write_half));

    loop {
        let envelope: Envelope<Request> = match read_frame(&mut reader).await {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!("session from {} ended: {}", peer, err);
                return;
            }
        };

        let service = service.clone();
        let writer = writer.clone();
        let peer = peer.clone();
        tokio::spawn(async move {
            let response = service.handle(envelope.body).await;
            let reply = Envelope {
                id: envelope.id,
                body: response,
            };
            let mut writer = writer.lock().await;
            if let Err(err) = write_frame(&mut *writer, &reply).await {
                warn!("failed to reply to {}: {}", peer, err);
            }
        });
    }
}
