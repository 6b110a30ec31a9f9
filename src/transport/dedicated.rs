//! Per-consumer worker: one thread, one channel, one conversation.
//!
//! The loop processes each request to completion before taking the next,
//! so responses leave in request order and no correlation beyond the
//! search `id` is needed. `init` runs its corpus fetch inline: with a
//! single consumer there is nobody else to keep serving while it runs.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::engine::SearchEngine;
use crate::fetch::CorpusFetcher;
use crate::protocol::{Request, Response};
use crate::transport::MessagePort;

/// Consumer handle to a dedicated worker. Dropping it closes the channel
/// and the worker thread exits.
pub struct DedicatedWorker {
    requests: Sender<Request>,
    responses: Receiver<Response>,
}

/// Spawn a dedicated worker around a fresh engine.
pub fn spawn(fetcher: impl CorpusFetcher + 'static) -> DedicatedWorker {
    let (req_tx, req_rx) = channel::<Request>();
    let (resp_tx, resp_rx) = channel::<Response>();

    thread::spawn(move || {
        let mut engine = SearchEngine::new();
        while let Ok(request) = req_rx.recv() {
            let response = handle(&mut engine, &fetcher, request);
            if resp_tx.send(response).is_err() {
                // Consumer is gone; nothing left to serve.
                break;
            }
        }
    });

    DedicatedWorker {
        requests: req_tx,
        responses: resp_rx,
    }
}

/// Process one request against the engine. Engine errors never escape the
/// worker: they are logged and answered with a failure or empty response.
fn handle(
    engine: &mut SearchEngine,
    fetcher: &dyn CorpusFetcher,
    request: Request,
) -> Response {
    match request {
        Request::Init { origin } => match engine.init(fetcher, &origin) {
            // Reply ready even when the engine was already initialized:
            // every init gets exactly one answer.
            Ok(()) => Response::Ready,
            Err(e) => {
                tracing::error!(error = %e, origin = %origin, "search index init failed");
                Response::InitFailed {
                    error: e.to_string(),
                }
            }
        },
        Request::SearchRequest { id, query } => {
            let results = engine.search(&query).unwrap_or_else(|e| {
                tracing::error!(error = %e, query = %query, "search failed");
                Vec::new()
            });
            Response::SearchResponse { id, results }
        }
    }
}

impl MessagePort for DedicatedWorker {
    fn post(&self, request: Request) {
        if self.requests.send(request).is_err() {
            tracing::warn!("search worker is gone; dropping message");
        }
    }

    fn try_recv(&self) -> Option<Response> {
        self.responses.try_recv().ok()
    }

    fn recv_timeout(&self, timeout: Duration) -> Option<Response> {
        self.responses.recv_timeout(timeout).ok()
    }
}
