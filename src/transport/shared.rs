//! Shared worker: one engine, one loop, any number of ports.
//!
//! Every port funnels its requests into a single event channel tagged with
//! the port id; each port gets its own response channel back. The loop is
//! single-threaded and processes each event to completion, with one
//! exception: the corpus fetch runs on a helper thread and re-enters the
//! loop as a fetch-done event, so other ports stay served while init is in
//! flight.
//!
//! # Init batching
//!
//! Ports that send `init` before the corpus has loaded are queued, and the
//! fetch is started at most once. When it resolves, every queued port gets
//! exactly one `ready` (or one `init-failed`), however many tabs opened at
//! the same instant.
//!
//! # Searches racing init
//!
//! A `search-request` that arrives while init is in flight is deferred and
//! served from the fully-built index once init resolves; it is never run
//! against a partially-built one. If init fails, deferred searches are
//! answered with empty results rather than left hanging.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::engine::{EngineState, SearchEngine};
use crate::fetch::{CorpusFetcher, FetchError};
use crate::protocol::{Request, Response};
use crate::transport::MessagePort;
use crate::types::SearchBlocks;

/// Identifies one connected port within a shared worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(u64);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port#{}", self.0)
    }
}

/// Everything that can wake the worker loop.
enum Event {
    Connect { port: PortId, replies: Sender<Response> },
    Message { port: PortId, request: Request },
    Disconnect { port: PortId },
    FetchDone { result: Result<SearchBlocks, FetchError> },
}

/// Handle owned by the application; spawn once, then
/// [`connect`](SharedWorker::connect) a port per consumer.
///
/// The worker thread and its index live for the rest of the process, like
/// the shared browser worker it models; ports come and go underneath it.
pub struct SharedWorker {
    events: Sender<Event>,
    next_port: AtomicU64,
}

/// One consumer's endpoint into a shared worker. Dropping it disconnects
/// the port; the worker and its index live on for the other ports.
pub struct SharedPort {
    port: PortId,
    events: Sender<Event>,
    replies: Receiver<Response>,
}

impl SharedWorker {
    /// Spawn the shared worker around a fresh engine.
    pub fn spawn(fetcher: impl CorpusFetcher + 'static) -> Self {
        let (events, inbox) = channel::<Event>();
        let loopback = events.clone();
        let fetcher = Arc::new(fetcher);
        thread::spawn(move || WorkerLoop::new(loopback, fetcher).run(inbox));
        SharedWorker {
            events,
            next_port: AtomicU64::new(0),
        }
    }

    /// Connect a new port. Ports are cheap; every tab gets its own.
    pub fn connect(&self) -> SharedPort {
        let port = PortId(self.next_port.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = channel::<Response>();
        let _ = self.events.send(Event::Connect { port, replies: tx });
        SharedPort {
            port,
            events: self.events.clone(),
            replies: rx,
        }
    }
}

impl MessagePort for SharedPort {
    fn post(&self, request: Request) {
        let event = Event::Message {
            port: self.port,
            request,
        };
        if self.events.send(event).is_err() {
            tracing::warn!(port = %self.port, "shared search worker is gone; dropping message");
        }
    }

    fn try_recv(&self) -> Option<Response> {
        self.replies.try_recv().ok()
    }

    fn recv_timeout(&self, timeout: Duration) -> Option<Response> {
        self.replies.recv_timeout(timeout).ok()
    }
}

impl Drop for SharedPort {
    fn drop(&mut self) {
        let _ = self.events.send(Event::Disconnect { port: self.port });
    }
}

/// Worker-side state. Only the loop thread touches any of this, so the
/// queues need no synchronization, just the enqueue-then-check ordering
/// the handlers below keep.
struct WorkerLoop {
    engine: SearchEngine,
    fetcher: Arc<dyn CorpusFetcher>,
    /// Loopback sender handed to fetch helper threads.
    events: Sender<Event>,
    ports: HashMap<PortId, Sender<Response>>,
    /// Ports owed a `ready` once the in-flight init resolves.
    awaiting_ready: Vec<PortId>,
    /// Searches deferred behind the in-flight init.
    deferred: Vec<(PortId, u64, String)>,
}

impl WorkerLoop {
    fn new(events: Sender<Event>, fetcher: Arc<dyn CorpusFetcher>) -> Self {
        WorkerLoop {
            engine: SearchEngine::new(),
            fetcher,
            events,
            ports: HashMap::new(),
            awaiting_ready: Vec::new(),
            deferred: Vec::new(),
        }
    }

    fn run(mut self, inbox: Receiver<Event>) {
        while let Ok(event) = inbox.recv() {
            match event {
                Event::Connect { port, replies } => {
                    self.ports.insert(port, replies);
                }
                Event::Disconnect { port } => {
                    self.ports.remove(&port);
                    self.awaiting_ready.retain(|p| *p != port);
                    self.deferred.retain(|(p, _, _)| *p != port);
                }
                Event::Message { port, request } => self.on_message(port, request),
                Event::FetchDone { result } => self.on_fetch_done(result),
            }
        }
    }

    fn on_message(&mut self, port: PortId, request: Request) {
        match request {
            Request::Init { origin } => {
                if self.engine.state() == EngineState::Ready {
                    self.reply(port, Response::Ready);
                    return;
                }
                // Enqueue first, then check whether a fetch is in flight;
                // the port must be on the queue before anything can resolve
                // init.
                self.awaiting_ready.push(port);
                if self.engine.begin_init() {
                    let fetcher = Arc::clone(&self.fetcher);
                    let loopback = self.events.clone();
                    thread::spawn(move || {
                        let result = fetcher.fetch(&origin);
                        let _ = loopback.send(Event::FetchDone { result });
                    });
                }
            }
            Request::SearchRequest { id, query } => match self.engine.state() {
                EngineState::Ready => self.serve_search(port, id, &query),
                EngineState::Initializing => self.deferred.push((port, id, query)),
                // No init was ever requested on this worker: answer empty
                // rather than crash or hang.
                EngineState::Uninitialized => {
                    self.reply(port, Response::SearchResponse { id, results: Vec::new() });
                }
            },
        }
    }

    fn on_fetch_done(&mut self, result: Result<SearchBlocks, FetchError>) {
        let outcome = match result {
            Ok(blocks) => self.engine.finish_init(blocks),
            Err(e) => {
                self.engine.abort_init();
                Err(e.into())
            }
        };
        match outcome {
            Ok(()) => {
                for port in std::mem::take(&mut self.awaiting_ready) {
                    self.reply(port, Response::Ready);
                }
                for (port, id, query) in std::mem::take(&mut self.deferred) {
                    self.serve_search(port, id, &query);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "shared search index init failed");
                let error = e.to_string();
                for port in std::mem::take(&mut self.awaiting_ready) {
                    self.reply(
                        port,
                        Response::InitFailed {
                            error: error.clone(),
                        },
                    );
                }
                for (port, id, _) in std::mem::take(&mut self.deferred) {
                    self.reply(port, Response::SearchResponse { id, results: Vec::new() });
                }
            }
        }
    }

    fn serve_search(&mut self, port: PortId, id: u64, query: &str) {
        let results = self.engine.search(query).unwrap_or_else(|e| {
            tracing::error!(error = %e, query = %query, "search failed");
            Vec::new()
        });
        self.reply(port, Response::SearchResponse { id, results });
    }

    /// Reply to a port; a port that disappeared mid-flight is a no-op, not
    /// an error.
    fn reply(&mut self, port: PortId, response: Response) {
        if let Some(replies) = self.ports.get(&port) {
            if replies.send(response).is_err() {
                self.ports.remove(&port);
            }
        }
    }
}
