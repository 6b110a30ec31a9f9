//! Worker transport behavior: protocol handling on both variants.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{node, steps_corpus, FlakyFetcher, Gate, GatedFetcher, StaticFetcher};
use talpa::protocol::{Request, Response};
use talpa::store::SearchStore;
use talpa::transport::dedicated;
use talpa::transport::shared::SharedWorker;
use talpa::transport::{MessagePort, TransportKind};

const WAIT: Duration = Duration::from_secs(5);
const SETTLE: Duration = Duration::from_millis(100);

fn init(origin: &str) -> Request {
    Request::Init {
        origin: origin.to_string(),
    }
}

fn search(id: u64, query: &str) -> Request {
    Request::SearchRequest {
        id,
        query: query.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Dedicated variant
// ---------------------------------------------------------------------------

#[test]
fn test_dedicated_init_then_search() {
    let (fetcher, _) = StaticFetcher::new(steps_corpus());
    let worker = dedicated::spawn(fetcher);

    worker.post(init("https://example.com"));
    assert_eq!(worker.recv_timeout(WAIT), Some(Response::Ready));

    worker.post(search(1, "steps"));
    let Some(Response::SearchResponse { id, results }) = worker.recv_timeout(WAIT) else {
        panic!("expected a search response");
    };
    assert_eq!(id, 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].href, "/docs/get-started");
}

#[test]
fn test_dedicated_every_init_gets_a_ready() {
    let (fetcher, fetches) = StaticFetcher::new(steps_corpus());
    let worker = dedicated::spawn(fetcher);

    worker.post(init("https://example.com"));
    worker.post(init("https://example.com"));
    assert_eq!(worker.recv_timeout(WAIT), Some(Response::Ready));
    assert_eq!(worker.recv_timeout(WAIT), Some(Response::Ready));
    // Ready twice, fetched once.
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dedicated_search_before_init_is_empty_response() {
    let (fetcher, _) = StaticFetcher::new(steps_corpus());
    let worker = dedicated::spawn(fetcher);

    worker.post(search(1, "steps"));
    let Some(Response::SearchResponse { id, results }) = worker.recv_timeout(WAIT) else {
        panic!("expected a search response");
    };
    assert_eq!(id, 1);
    assert!(results.is_empty());
}

#[test]
fn test_dedicated_init_failure_then_retry() {
    let worker = dedicated::spawn(FlakyFetcher::new(steps_corpus(), 1));

    worker.post(init("https://example.com"));
    let Some(Response::InitFailed { error }) = worker.recv_timeout(WAIT) else {
        panic!("expected init to fail");
    };
    assert!(error.contains("corpus"));

    worker.post(init("https://example.com"));
    assert_eq!(worker.recv_timeout(WAIT), Some(Response::Ready));
}

#[test]
fn test_dedicated_responses_arrive_in_request_order() {
    let (fetcher, _) = StaticFetcher::new(steps_corpus());
    let worker = dedicated::spawn(fetcher);

    worker.post(init("https://example.com"));
    worker.post(search(1, "steps"));
    worker.post(search(2, "follow"));

    assert_eq!(worker.recv_timeout(WAIT), Some(Response::Ready));
    for expected in [1, 2] {
        let Some(Response::SearchResponse { id, .. }) = worker.recv_timeout(WAIT) else {
            panic!("expected a search response");
        };
        assert_eq!(id, expected);
    }
}

// ---------------------------------------------------------------------------
// Shared variant
// ---------------------------------------------------------------------------

#[test]
fn test_shared_init_batches_to_one_fetch() {
    let gate = Gate::closed();
    let (fetcher, fetches) = GatedFetcher::new(steps_corpus(), gate.clone());
    let worker = SharedWorker::spawn(fetcher);

    let ports: Vec<_> = (0..4).map(|_| worker.connect()).collect();
    for port in &ports {
        port.post(init("https://example.com"));
    }
    // Corpus has not arrived; nobody is ready yet.
    assert_eq!(ports[0].recv_timeout(SETTLE), None);

    gate.open();
    for port in &ports {
        assert_eq!(port.recv_timeout(WAIT), Some(Response::Ready));
        // Exactly one ready each.
        assert_eq!(port.recv_timeout(SETTLE), None);
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shared_late_port_gets_ready_immediately() {
    let (fetcher, fetches) = StaticFetcher::new(steps_corpus());
    let worker = SharedWorker::spawn(fetcher);

    let first = worker.connect();
    first.post(init("https://example.com"));
    assert_eq!(first.recv_timeout(WAIT), Some(Response::Ready));

    let late = worker.connect();
    late.post(init("https://example.com"));
    assert_eq!(late.recv_timeout(WAIT), Some(Response::Ready));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shared_search_during_init_is_deferred_not_dropped() {
    let gate = Gate::closed();
    let (fetcher, _) = GatedFetcher::new(steps_corpus(), gate.clone());
    let worker = SharedWorker::spawn(fetcher);

    let initiator = worker.connect();
    let searcher = worker.connect();

    initiator.post(init("https://example.com"));
    // Give the worker a beat to start the fetch, then race a search in.
    std::thread::sleep(SETTLE);
    searcher.post(search(7, "steps"));
    assert_eq!(searcher.recv_timeout(SETTLE), None);

    gate.open();
    let Some(Response::SearchResponse { id, results }) = searcher.recv_timeout(WAIT) else {
        panic!("expected the deferred search to be served");
    };
    assert_eq!(id, 7);
    // Served against the fully built index, not a partial one.
    assert_eq!(results.len(), 1);
}

#[test]
fn test_shared_search_with_no_init_anywhere_is_empty() {
    let (fetcher, fetches) = StaticFetcher::new(steps_corpus());
    let worker = SharedWorker::spawn(fetcher);

    let port = worker.connect();
    port.post(search(1, "steps"));
    let Some(Response::SearchResponse { id, results }) = port.recv_timeout(WAIT) else {
        panic!("expected a search response");
    };
    assert_eq!(id, 1);
    assert!(results.is_empty());
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn test_shared_init_failure_reaches_every_waiter() {
    let worker = SharedWorker::spawn(FlakyFetcher::new(steps_corpus(), 1));

    let a = worker.connect();
    let b = worker.connect();
    a.post(init("https://example.com"));
    b.post(init("https://example.com"));

    for port in [&a, &b] {
        let Some(Response::InitFailed { .. }) = port.recv_timeout(WAIT) else {
            panic!("expected init-failed on every waiting port");
        };
    }

    // The failure rolled back; a later init retries and succeeds.
    a.post(init("https://example.com"));
    assert_eq!(a.recv_timeout(WAIT), Some(Response::Ready));
    // b did not re-init, so b hears nothing more.
    assert_eq!(b.recv_timeout(SETTLE), None);
}

#[test]
fn test_shared_init_failure_answers_deferred_searches_empty() {
    let worker = SharedWorker::spawn(FlakyFetcher::new(steps_corpus(), 1));

    let port = worker.connect();
    port.post(init("https://example.com"));
    port.post(search(3, "steps"));

    // Failure order: the init answer and the deferred search answer.
    let Some(Response::InitFailed { .. }) = port.recv_timeout(WAIT) else {
        panic!("expected init-failed");
    };
    let Some(Response::SearchResponse { id, results }) = port.recv_timeout(WAIT) else {
        panic!("expected the deferred search to be answered");
    };
    assert_eq!(id, 3);
    assert!(results.is_empty());
}

#[test]
fn test_shared_disconnected_port_is_skipped() {
    let gate = Gate::closed();
    let (fetcher, _) = GatedFetcher::new(steps_corpus(), gate.clone());
    let worker = SharedWorker::spawn(fetcher);

    let keeper = worker.connect();
    let quitter = worker.connect();
    keeper.post(init("https://example.com"));
    quitter.post(init("https://example.com"));
    drop(quitter);

    gate.open();
    assert_eq!(keeper.recv_timeout(WAIT), Some(Response::Ready));
    // The worker survived replying past the dead port.
    keeper.post(search(1, "steps"));
    let Some(Response::SearchResponse { results, .. }) = keeper.recv_timeout(WAIT) else {
        panic!("expected a search response");
    };
    assert_eq!(results.len(), 1);
}

// ---------------------------------------------------------------------------
// Startup wiring
// ---------------------------------------------------------------------------

#[test]
fn test_transport_kind_selects_the_wiring() {
    let (fetcher, _) = StaticFetcher::new(steps_corpus());
    let shared = SharedWorker::spawn(fetcher);

    for kind in [
        TransportKind::Dedicated,
        TransportKind::Shared,
        TransportKind::None,
    ] {
        let port: Option<Box<dyn MessagePort>> = match kind {
            TransportKind::Dedicated => {
                let (fetcher, _) = StaticFetcher::new(steps_corpus());
                Some(Box::new(dedicated::spawn(fetcher)))
            }
            TransportKind::Shared => Some(Box::new(shared.connect())),
            TransportKind::None => None,
        };
        let mut store = SearchStore::new(port, "https://example.com");
        assert_eq!(store.has_worker(), kind != TransportKind::None);

        if store.has_worker() {
            let start = std::time::Instant::now();
            while !store.ready() && start.elapsed() < WAIT {
                store.pump();
                std::thread::sleep(Duration::from_millis(5));
            }
            assert!(store.ready(), "{:?} transport never became ready", kind);
        }
    }
}

#[test]
fn test_shared_ports_search_independently() {
    let (fetcher, _) = StaticFetcher::new(talpa::SearchBlocks {
        blocks: vec![
            node(&["Guide", "Overview"], None, "/docs/guide/#overview"),
            node(&["API", "Overview"], None, "/docs/api/#overview"),
        ],
    });
    let worker = SharedWorker::spawn(fetcher);

    let a = worker.connect();
    let b = worker.connect();
    a.post(init("https://example.com"));
    assert_eq!(a.recv_timeout(WAIT), Some(Response::Ready));

    a.post(search(1, "overview"));
    b.post(search(1, "api"));

    let Some(Response::SearchResponse { results, .. }) = a.recv_timeout(WAIT) else {
        panic!("expected a response on port a");
    };
    assert_eq!(results.len(), 2);

    let Some(Response::SearchResponse { results, .. }) = b.recv_timeout(WAIT) else {
        panic!("expected a response on port b");
    };
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].href, "/docs/api/#overview");
}
