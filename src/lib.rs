//! Client-side full-text search for static documentation sites.
//!
//! talpa covers the whole path from markdown sources to search results in
//! a running page: a build-time extractor flattens documents into an
//! indexable corpus, a worker-hosted engine builds a prefix index from it,
//! and typed message channels carry queries between UI consumers and the
//! worker, including the multi-port coordination needed when one worker
//! serves several tabs.
//!
//! # Architecture
//!
//! ```text
//!  build time                        run time
//! ┌────────────┐   search.json   ┌──────────────────────────────┐
//! │  extract   │ ──────────────▶ │  transport (worker thread)   │
//! │ (markdown  │                 │  ┌────────────────────────┐  │
//! │  → blocks) │                 │  │ engine: prefix index + │  │
//! └────────────┘                 │  │ href lookup table      │  │
//!                                │  └────────────────────────┘  │
//!                                └───────────▲──────────────────┘
//!                                  protocol  │ (typed messages)
//!                                ┌───────────▼──────────────────┐
//!                                │  store: query/results/open   │
//!                                └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use talpa::fetch::HttpFetcher;
//! use talpa::store::SearchStore;
//! use talpa::transport::dedicated;
//!
//! let worker = dedicated::spawn(HttpFetcher::new());
//! let mut store = SearchStore::new(Some(Box::new(worker)), "https://docs.example.com");
//! store.search("install");
//! // ... later, from the UI tick:
//! store.pump();
//! for result in store.results() {
//!     println!("{}  {}", result.href, result.title);
//! }
//! ```
//!
//! For several consumers over one index, spawn a
//! [`transport::shared::SharedWorker`] once and
//! [`connect`](transport::shared::SharedWorker::connect) a port per
//! consumer.

pub mod engine;
pub mod extract;
pub mod fetch;
pub mod protocol;
pub mod store;
pub mod transport;
pub mod types;
pub mod utils;

// Re-exports for public API
pub use engine::{EngineError, EngineState, SearchEngine};
pub use fetch::{CorpusFetcher, DirFetcher, FetchError, HttpFetcher};
pub use protocol::{Request, Response};
pub use store::SearchStore;
pub use transport::{MessagePort, TransportKind};
pub use types::{SearchBlocks, SearchNode, SearchResult};
