// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The consumer-side search store.
//!
//! Owns the UI-visible state (`query`, `results`, `is_open`) and the
//! conversation with whichever transport the application wired at startup.
//! Queries update local state synchronously and go out as asynchronous
//! `search-request`s; [`pump`](SearchStore::pump) applies whatever
//! responses have arrived since the last call.
//!
//! Responses carry the id of the request they answer; `pump` keeps only
//! the response to the newest request sent and discards stale ones, so a
//! slow early query can never stomp the results of a later one.
//!
//! Without a port the store degrades to pure local state: queries update
//! `query`, results stay empty, open/close still work. That is a
//! legitimate reduced-functionality mode, not an error.

use crate::protocol::{Request, Response};
use crate::transport::MessagePort;
use crate::types::SearchResult;

pub struct SearchStore {
    query: String,
    results: Vec<SearchResult>,
    is_open: bool,
    ready: bool,
    init_error: Option<String>,
    next_id: u64,
    /// Id of the newest search-request sent; only its response is applied.
    latest: u64,
    origin: String,
    port: Option<Box<dyn MessagePort>>,
}

impl SearchStore {
    /// Build the store and, when a port is present, kick off index init
    /// for `origin` immediately.
    pub fn new(port: Option<Box<dyn MessagePort>>, origin: &str) -> Self {
        if let Some(port) = &port {
            port.post(Request::Init {
                origin: origin.to_string(),
            });
        }
        SearchStore {
            query: String::new(),
            results: Vec::new(),
            is_open: false,
            ready: false,
            init_error: None,
            next_id: 0,
            latest: 0,
            origin: origin.to_string(),
            port,
        }
    }

    /// Ask the worker to init again, typically after
    /// [`init_error`](SearchStore::init_error) reported a failure. The
    /// worker fetches at most once however many of these it receives.
    pub fn retry_init(&mut self) {
        if let Some(port) = &self.port {
            port.post(Request::Init {
                origin: self.origin.clone(),
            });
        }
    }

    /// Update the query synchronously and forward it to the worker.
    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        if let Some(port) = &self.port {
            self.next_id += 1;
            self.latest = self.next_id;
            port.post(Request::SearchRequest {
                id: self.latest,
                query: query.to_string(),
            });
        }
    }

    /// Apply every response that has arrived since the last pump.
    /// Returns the number of responses applied (stale ones count as
    /// handled but change nothing).
    pub fn pump(&mut self) -> usize {
        let Some(port) = &self.port else { return 0 };
        let mut handled = 0;
        while let Some(response) = port.try_recv() {
            handled += 1;
            match response {
                Response::Ready => {
                    self.ready = true;
                    self.init_error = None;
                }
                Response::InitFailed { error } => {
                    self.ready = false;
                    self.init_error = Some(error);
                }
                Response::SearchResponse { id, results } => {
                    if id == self.latest {
                        self.results = results;
                    }
                    // Older id: a superseded query's answer arriving late.
                }
            }
        }
        handled
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Close the dialog and clear the query.
    pub fn close(&mut self) {
        self.is_open = false;
        self.query.clear();
    }

    pub fn toggle_open(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[inline]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// True once the worker has confirmed the index is built.
    #[inline]
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// The last init failure, if init has not succeeded since.
    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    /// Whether this store has a worker at all (false = degraded mode).
    #[inline]
    pub fn has_worker(&self) -> bool {
        self.port.is_some()
    }
}
