// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The message vocabulary spoken across the worker boundary.
//!
//! Two closed sets, one per direction. Both serialize as tagged JSON
//! objects (`{"type": "search-request", ...}`) so the wire format is
//! structured-clone compatible and inspectable. Handlers on both ends match
//! exhaustively; adding a variant is a compile error everywhere it is not
//! handled, and a breaking change for both ends at once (there is no
//! version field).
//!
//! `search-request` and `search-response` carry a monotonic `id` so a
//! consumer that fires queries in quick succession can tell which response
//! answers which request and discard stale ones.

use serde::{Deserialize, Serialize};

use crate::types::SearchResult;

/// Consumer → worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// Build the index from `<origin>/search.json`. Safe to send repeatedly;
    /// the corpus is fetched at most once per worker lifetime.
    Init { origin: String },
    /// Query the index.
    SearchRequest { id: u64, query: String },
}

/// Worker → consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    /// The index is built. Sent once per `init` received, even when the
    /// engine was already ready.
    Ready,
    /// Init failed (corpus fetch or corpus defect). The engine rolled back;
    /// a later `init` retries.
    InitFailed { error: String },
    /// Answer to the `search-request` carrying the same `id`.
    SearchResponse { id: u64, results: Vec<SearchResult> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let init = Request::Init {
            origin: "https://example.com".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&init).unwrap(),
            r#"{"type":"init","origin":"https://example.com"}"#
        );

        let search = Request::SearchRequest {
            id: 3,
            query: "steps".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&search).unwrap(),
            r#"{"type":"search-request","id":3,"query":"steps"}"#
        );
    }

    #[test]
    fn test_response_wire_format() {
        assert_eq!(
            serde_json::to_string(&Response::Ready).unwrap(),
            r#"{"type":"ready"}"#
        );
        let resp = Response::SearchResponse {
            id: 3,
            results: vec![],
        };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"type":"search-response","id":3,"results":[]}"#
        );
    }

    #[test]
    fn test_round_trip() {
        let msgs = vec![
            Request::Init {
                origin: "http://localhost:3000".to_string(),
            },
            Request::SearchRequest {
                id: 7,
                query: "overview".to_string(),
            },
        ];
        for msg in msgs {
            let json = serde_json::to_string(&msg).unwrap();
            let back: Request = serde_json::from_str(&json).unwrap();
            assert_eq!(back, msg);
        }
    }
}
