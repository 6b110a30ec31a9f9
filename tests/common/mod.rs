//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use talpa::fetch::{CorpusFetcher, FetchError};
use talpa::types::{SearchBlocks, SearchNode};

/// Build a node inline.
pub fn node(breadcrumbs: &[&str], content: Option<&str>, href: &str) -> SearchNode {
    SearchNode {
        breadcrumbs: breadcrumbs.iter().map(|s| s.to_string()).collect(),
        content: content.map(|s| s.to_string()),
        href: href.to_string(),
    }
}

/// The one-document corpus from the getting-started scenario.
pub fn steps_corpus() -> SearchBlocks {
    SearchBlocks {
        blocks: vec![node(
            &["Get Started"],
            Some("Follow the steps"),
            "/docs/get-started",
        )],
    }
}

/// Serves a fixed corpus and counts how many times it was fetched.
pub struct StaticFetcher {
    blocks: SearchBlocks,
    fetches: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new(blocks: SearchBlocks) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        (
            StaticFetcher {
                blocks,
                fetches: Arc::clone(&fetches),
            },
            fetches,
        )
    }
}

impl CorpusFetcher for StaticFetcher {
    fn fetch(&self, _origin: &str) -> Result<SearchBlocks, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.blocks.clone())
    }
}

/// A gate that fetchers can block on, so tests control exactly when the
/// corpus "arrives".
#[derive(Clone)]
pub struct Gate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn closed() -> Self {
        Gate {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

/// Serves a fixed corpus, but only after the gate opens.
pub struct GatedFetcher {
    blocks: SearchBlocks,
    gate: Gate,
    fetches: Arc<AtomicUsize>,
}

impl GatedFetcher {
    pub fn new(blocks: SearchBlocks, gate: Gate) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        (
            GatedFetcher {
                blocks,
                gate,
                fetches: Arc::clone(&fetches),
            },
            fetches,
        )
    }
}

impl CorpusFetcher for GatedFetcher {
    fn fetch(&self, _origin: &str) -> Result<SearchBlocks, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.gate.wait();
        Ok(self.blocks.clone())
    }
}

/// Fails the first `failures` fetches, then serves the corpus. Exercises
/// init-failure rollback and retry.
pub struct FlakyFetcher {
    blocks: SearchBlocks,
    failures: AtomicUsize,
}

impl FlakyFetcher {
    pub fn new(blocks: SearchBlocks, failures: usize) -> Self {
        FlakyFetcher {
            blocks,
            failures: AtomicUsize::new(failures),
        }
    }
}

impl CorpusFetcher for FlakyFetcher {
    fn fetch(&self, _origin: &str) -> Result<SearchBlocks, FetchError> {
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(FetchError::Io {
                path: "search.json".into(),
                source: std::io::Error::other("corpus unavailable"),
            });
        }
        Ok(self.blocks.clone())
    }
}
