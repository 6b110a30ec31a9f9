// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of the search corpus.
//!
//! These types define the shape of the corpus artifact that the extractor
//! writes and the engine ingests, and the result records that cross the
//! worker boundary.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **SearchNode**: `breadcrumbs` is never empty. The last segment is the
//!   node's own heading text; everything before it is the ancestor trail,
//!   outermost first.
//! - **SearchNode**: `href` is unique across the whole corpus. It is the
//!   primary key of the engine's lookup table; duplicates are rejected at
//!   extraction time and again at engine init.
//! - **SearchResult**: `title == breadcrumbs.last()`. Derived at init, never
//!   stored independently in the corpus artifact.
//!
//! Rather than trusting every call site to remember these, construction goes
//! through [`SearchNode::to_result`], which derives the title in one place.

use serde::{Deserialize, Serialize};

/// One indexable unit of a document: the document root or a single heading
/// section, with the breadcrumb trail that leads to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchNode {
    /// Ancestor heading titles, outermost first. Never empty; the last
    /// segment is this node's own heading.
    pub breadcrumbs: Vec<String>,
    /// Plain-text body of this section, up to its first child heading.
    /// Absent for structural-only nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Deep-link address: `/docs/<slug>` for a document root,
    /// `/docs/<slug>/#<heading-slug>` for a subordinate heading.
    pub href: String,
}

impl SearchNode {
    /// Materialize this node into a renderable result record.
    ///
    /// Returns `None` when `breadcrumbs` is empty, which a well-formed
    /// corpus never contains; engine init rejects such nodes up front.
    pub fn to_result(&self) -> Option<SearchResult> {
        let title = self.breadcrumbs.last()?.clone();
        Some(SearchResult {
            breadcrumbs: self.breadcrumbs.clone(),
            content: self.content.clone(),
            href: self.href.clone(),
            title,
        })
    }
}

/// A [`SearchNode`] plus its derived `title` (the last breadcrumb segment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub breadcrumbs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub href: String,
    pub title: String,
}

/// The serialized corpus artifact: every indexable block from every
/// document, produced once at build time and consumed once per engine
/// lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBlocks {
    pub blocks: Vec<SearchNode>,
}
