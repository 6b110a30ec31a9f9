//! The worker boundary: message-passing transports around the engine.
//!
//! A worker is an OS thread owning one [`crate::engine::SearchEngine`];
//! consumers talk to it exclusively through channels using the
//! [`crate::protocol`] vocabulary. No shared memory, no locks.
//!
//! Two variants:
//!
//! - [`dedicated`]: one worker per consumer, one conversation per channel.
//! - [`shared`]: one worker multiplexing any number of ports, with init
//!   batched so simultaneous consumers trigger a single corpus fetch.
//!
//! Which variant (or none) a deployment uses is an explicit
//! [`TransportKind`] decision made at startup, not a runtime capability
//! probe; each variant is testable on its own.

pub mod dedicated;
pub mod shared;

use std::time::Duration;

use crate::protocol::{Request, Response};

/// Transport selection, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// One worker thread per consumer ([`dedicated::spawn`]).
    Dedicated,
    /// One worker shared by all consumers
    /// ([`shared::SharedWorker::spawn`] once, then
    /// [`connect`](shared::SharedWorker::connect) per consumer).
    Shared,
    /// No worker available: the store runs in degraded local-only mode.
    None,
}

/// Consumer-side endpoint of a worker channel.
///
/// Both transport variants hand the store one of these; the store neither
/// knows nor cares which worker shape is on the other end.
pub trait MessagePort: Send {
    /// Post a request to the worker. A dead worker swallows the message;
    /// the consumer keeps functioning in degraded form.
    fn post(&self, request: Request);

    /// Non-blocking poll for the next response.
    fn try_recv(&self) -> Option<Response>;

    /// Blocking poll with a deadline. `None` on timeout or a dead worker.
    fn recv_timeout(&self, timeout: Duration) -> Option<Response>;
}
