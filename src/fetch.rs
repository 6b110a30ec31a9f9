//! Corpus retrieval for engine init.
//!
//! The engine does not care where `search.json` lives; it asks a
//! [`CorpusFetcher`] for the blocks behind an origin. Production workers use
//! [`HttpFetcher`]; the CLI and the test suite use [`DirFetcher`] against a
//! directory on disk. Keeping the seam here is what lets the engine and both
//! transports run without a live site.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::SearchBlocks;

/// Name of the corpus artifact, resolved relative to an origin.
pub const CORPUS_FILE: &str = "search.json";

/// Default timeout for HTTP corpus fetches. A stalled fetch would otherwise
/// wedge init and every consumer queued behind it.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from fetching or decoding the corpus artifact.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid corpus JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetches the corpus artifact for an origin.
///
/// Implementations must be cheap to share: the shared worker hands a clone
/// of its fetcher to a helper thread per in-flight init.
pub trait CorpusFetcher: Send + Sync {
    /// Fetch and decode `<origin>/search.json`.
    fn fetch(&self, origin: &str) -> Result<SearchBlocks, FetchError>;
}

/// Fetches `search.json` over HTTP from `<origin>/search.json`.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        HttpFetcher { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusFetcher for HttpFetcher {
    fn fetch(&self, origin: &str) -> Result<SearchBlocks, FetchError> {
        let url = format!("{}/{}", origin.trim_end_matches('/'), CORPUS_FILE);
        let http_err = |source| FetchError::Http {
            url: url.clone(),
            source,
        };
        self.client
            .get(&url)
            .send()
            .map_err(&http_err)?
            .error_for_status()
            .map_err(&http_err)?
            .json::<SearchBlocks>()
            .map_err(&http_err)
    }
}

/// Fetches `search.json` from a directory on the local filesystem; the
/// origin is the directory path.
pub struct DirFetcher;

impl CorpusFetcher for DirFetcher {
    fn fetch(&self, origin: &str) -> Result<SearchBlocks, FetchError> {
        let path = PathBuf::from(origin).join(CORPUS_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}
