//! Multiplexing RPC client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use crate::codec::{read_frame, write_frame};
use crate::error::NetError;
use crate::message::{Envelope, Request, Response};

type PendingCalls = Arc<Mutex<HashMap<u64, oneshot::Sender<Response>>>>;

/// One session to a remote peer.
///
/// Cheap to clone; concurrent calls from any number of tasks are multiplexed
/// over the single connection by request id.
#[derive(Clone)]
pub struct RpcClient {
    next_id: Arc<AtomicU64>,
    pending: PendingCalls,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    closed: Arc<AtomicBool>,
    peer: String,
}

impl RpcClient {
    /// Connects to `addr` and spawns the response reader task.
    pub async fn connect(addr: &str) -> Result<Self, NetError> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        let pending: PendingCalls = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        tokio::spawn(read_responses(
            read_half,
            pending.clone(),
            closed.clone(),
            addr.to_string(),
        ));
        Ok(Self {
            next_id: Arc::new(AtomicU64::new(1)),
            pending,
            writer: Arc::new(Mutex::new(write_half)),
            closed,
            peer: addr.to_string(),
        })
    }

    /// Issues one request and waits for its response.
    pub async fn call(&self, request: Request) -> Result<Response, NetError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(NetError::ConnectionClosed);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let envelope = Envelope { id, body: request };
        {
            let mut writer = self.writer.lock().await;
            if let Err(err) = write_frame(&mut *writer, &envelope).await {
                self.pending.lock().await.remove(&id);
                return Err(err);
            }
        }

        // the session may have died between the insert and the write, after
        // the reader already failed every pending call it knew about
        if self.closed.load(Ordering::SeqCst) && self.pending.lock().await.remove(&id).is_some() {
            return Err(NetError::ConnectionClosed);
        }

        rx.await.map_err(|_| NetError::ConnectionClosed)
    }

    /// The address this session was dialed to.
    pub fn peer(&self) -> &str {
        &self.peer
    }
}

/// Completes pending calls as responses arrive. A failed read fails the
/// session: every pending call resolves to `ConnectionClosed`.
async fn read_responses(
    mut reader: OwnedReadHalf,
    pending: PendingCalls,
    closed: Arc<AtomicBool>,
    peer: String,
) {
    loop {
        match read_frame::<_, Envelope<Response>>(&mut reader).await {
            Ok(envelope) => {
                let sender = pending.lock().await.remove(&envelope.id);
                match sender {
                    Some(tx) => {
                        let _ = tx.send(envelope.body);
                    }
                    None => debug!(
                        "response {} from {} matches no pending call",
                        envelope.id, peer
                    ),
                }
            }
            Err(err) => {
                warn!("session to {} closed: {}", peer, err);
                closed.store(true, Ordering::SeqCst);
                pending.lock().await.clear();
                return;
            }
        }
    }
}
