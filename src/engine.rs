// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The in-memory search engine: prefix index plus lookup table.
//!
//! One engine lives inside each worker and owns two structures built from
//! the corpus:
//!
//! ```text
//! ┌──────────────────┐      ┌───────────────────────┐
//! │   prefix index   │      │     lookup table      │
//! │ token → [href..] │ ───▶ │ href → SearchResult   │
//! └──────────────────┘      └───────────────────────┘
//! ```
//!
//! The index maps every forward prefix of every word in `title + content`
//! to the hrefs containing it; the lookup table materializes hits into full
//! records. Both are immutable once built.
//!
//! # Lifecycle
//!
//! `Uninitialized → Initializing → Ready`, with no path back except a
//! failed init rolling `Initializing` back to `Uninitialized` so the caller
//! can retry. A worker that runs the corpus fetch on its own thread drives
//! the split transitions ([`begin_init`](SearchEngine::begin_init) /
//! [`finish_init`](SearchEngine::finish_init) /
//! [`abort_init`](SearchEngine::abort_init)); blocking callers use
//! [`init`](SearchEngine::init).
//!
//! # Invariants
//!
//! 1. **NO_DANGLING_HREF**: every href in the index has exactly one lookup
//!    entry. A hit that misses the lookup table is reported as
//!    [`EngineError::MissingLookupEntry`], never silently dropped.
//! 2. **UNIQUE_HREF**: ingest rejects a corpus with duplicate hrefs.
//! 3. **FROZEN_AFTER_INIT**: no node is added, removed, or mutated once the
//!    engine is `Ready`.

use std::collections::{HashMap, HashSet};

use crate::fetch::{CorpusFetcher, FetchError};
use crate::types::{SearchBlocks, SearchResult};
use crate::utils::{forward_prefixes, normalize, words};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Errors from engine init and search.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("corpus fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("duplicate href in corpus: {href}")]
    DuplicateHref { href: String },
    #[error("corpus node {href} has empty breadcrumbs")]
    EmptyBreadcrumbs { href: String },
    #[error("index returned href with no lookup entry: {href}")]
    MissingLookupEntry { href: String },
}

/// The search engine. One instance per worker; construct with
/// [`SearchEngine::new`] and feed it a corpus exactly once.
pub struct SearchEngine {
    state: EngineState,
    /// token → hrefs containing it, in corpus order, deduplicated.
    index: HashMap<String, Vec<String>>,
    /// href → full result record.
    lookup: HashMap<String, SearchResult>,
}

impl SearchEngine {
    pub fn new() -> Self {
        SearchEngine {
            state: EngineState::Uninitialized,
            index: HashMap::new(),
            lookup: HashMap::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Blocking init: fetch the corpus for `origin` and build the index.
    ///
    /// Idempotent: a `Ready` engine returns immediately without a second
    /// fetch. On failure the state rolls back to `Uninitialized` and the
    /// error propagates, so a later call can retry.
    pub fn init(&mut self, fetcher: &dyn CorpusFetcher, origin: &str) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready => Ok(()),
            // A blocking caller owns the engine exclusively, so it can never
            // observe its own in-flight init. Nothing to do.
            EngineState::Initializing => Ok(()),
            EngineState::Uninitialized => {
                self.state = EngineState::Initializing;
                let blocks = match fetcher.fetch(origin) {
                    Ok(blocks) => blocks,
                    Err(e) => {
                        self.state = EngineState::Uninitialized;
                        return Err(e.into());
                    }
                };
                self.finish_init(blocks)
            }
        }
    }

    /// Start the split init sequence: `Uninitialized → Initializing`.
    ///
    /// Returns `true` when the transition happened and the caller now owns
    /// the (single) corpus fetch; `false` when init is already in flight or
    /// done, in which case the caller must NOT fetch again.
    pub fn begin_init(&mut self) -> bool {
        if self.state == EngineState::Uninitialized {
            self.state = EngineState::Initializing;
            true
        } else {
            false
        }
    }

    /// Complete the split init sequence with a fetched corpus.
    ///
    /// On success the engine is `Ready`; on a corpus defect (duplicate
    /// href, empty breadcrumbs) it rolls back to `Uninitialized` with
    /// nothing ingested.
    pub fn finish_init(&mut self, blocks: SearchBlocks) -> Result<(), EngineError> {
        debug_assert_eq!(self.state, EngineState::Initializing);
        match Self::build(blocks) {
            Ok((index, lookup)) => {
                self.index = index;
                self.lookup = lookup;
                self.state = EngineState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Roll back an in-flight init whose fetch failed.
    pub fn abort_init(&mut self) {
        if self.state == EngineState::Initializing {
            self.state = EngineState::Uninitialized;
        }
    }

    /// Build index and lookup table off to the side, so a failed ingest
    /// leaves the engine untouched.
    fn build(
        blocks: SearchBlocks,
    ) -> Result<(HashMap<String, Vec<String>>, HashMap<String, SearchResult>), EngineError> {
        let mut index: HashMap<String, Vec<String>> = HashMap::new();
        let mut lookup: HashMap<String, SearchResult> = HashMap::new();

        for node in &blocks.blocks {
            let result = node.to_result().ok_or(EngineError::EmptyBreadcrumbs {
                href: node.href.clone(),
            })?;

            let text = match &result.content {
                Some(content) => format!("{} {}", result.title, content),
                None => result.title.clone(),
            };
            let normalized = normalize(&text);

            // Dedupe tokens per node so a repeated word doesn't post the
            // same href twice.
            let mut tokens: HashSet<&str> = HashSet::new();
            for word in words(&normalized) {
                for prefix in forward_prefixes(word) {
                    tokens.insert(prefix);
                }
            }
            for token in tokens {
                index
                    .entry(token.to_string())
                    .or_default()
                    .push(node.href.clone());
            }

            if lookup.insert(node.href.clone(), result).is_some() {
                return Err(EngineError::DuplicateHref {
                    href: node.href.clone(),
                });
            }
        }

        Ok((index, lookup))
    }

    /// Query the index. Valid once `Ready`; on an engine that is not ready
    /// this returns an empty result set rather than failing.
    ///
    /// The query is tokenized exactly like the index was built (lowercase
    /// words); a document matches when every query word is a known prefix
    /// token of it. Results come back in index order.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, EngineError> {
        if self.state != EngineState::Ready {
            return Ok(Vec::new());
        }

        let normalized = normalize(query);
        let tokens: Vec<&str> = words(&normalized).collect();
        let Some((first, rest)) = tokens.split_first() else {
            // Empty query: defined as no results.
            return Ok(Vec::new());
        };

        let Some(postings) = self.index.get(*first) else {
            return Ok(Vec::new());
        };
        let mut hrefs: Vec<&String> = postings.iter().collect();
        for token in rest {
            let Some(postings) = self.index.get(*token) else {
                return Ok(Vec::new());
            };
            let matching: HashSet<&String> = postings.iter().collect();
            hrefs.retain(|href| matching.contains(href));
        }

        hrefs
            .into_iter()
            .map(|href| {
                self.lookup
                    .get(href)
                    .cloned()
                    .ok_or_else(|| EngineError::MissingLookupEntry { href: href.clone() })
            })
            .collect()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}
