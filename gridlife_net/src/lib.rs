//! GridLife Wire Protocol
//!
//! Framed JSON messages and the multiplexing request/response plumbing
//! shared by the controller, broker and workers.
//!
//! A session is one TCP connection. Every frame is a `u32` little-endian
//! payload length followed by a JSON [`Envelope`]; responses echo the
//! request id, so a single session multiplexes concurrent calls (the
//! controller keeps a long `ProcessGol` call in flight while issuing
//! periodic `CountAliveCells` on the same connection).

mod client;
mod codec;
mod error;
mod message;
mod server;

pub use client::RpcClient;
pub use codec::{read_frame, write_frame};
pub use error::NetError;
pub use message::{Envelope, Request, Response};
pub use server::{serve, RpcService};
