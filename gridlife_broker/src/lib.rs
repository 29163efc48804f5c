//! GridLife Broker Library
//!
//! The broker holds a bounded queue of pending partition jobs and one
//! dispatch task per subscribed worker; dispatch tasks compete for jobs off
//! the shared queue, which load-balances across heterogeneous worker speeds
//! without any assignment logic. `ProcessGol` owns the turn loop: one round
//! of partition jobs per turn, replies merged strictly in enqueue order,
//! with a pause/quit check point between rounds.

mod dispatch;
mod error;
mod queue;
mod round;
mod service;
mod state;

pub use dispatch::{dispatch_loop, RemoteWorker, WorkerLink};
pub use error::BrokerError;
pub use queue::{JobQueue, PartitionJob, QUEUE_CAPACITY};
pub use round::run_round;
pub use service::Broker;
pub use state::{RunControl, WorldState};
