// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the talpa command-line interface.
//!
//! Two subcommands: `extract` runs the build-time corpus extraction, and
//! `search` loads an extracted corpus into an engine and queries it, which
//! is the quickest way to smoke-test what a site's visitors will get.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "talpa",
    about = "Client-side documentation search: corpus extraction and querying",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a search corpus from a directory of markdown documents
    Extract {
        /// Input directory containing markdown documents
        #[arg(short, long)]
        input: String,

        /// Output directory for search.json
        #[arg(short, long)]
        output: String,

        /// Site route the documents are served under
        #[arg(long, default_value = "/docs")]
        route_prefix: String,
    },

    /// Query an extracted corpus and display results
    Search {
        /// Directory containing search.json (an extract output directory)
        #[arg(short, long)]
        corpus: String,

        /// Search query
        query: String,

        /// Maximum number of results to display
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}
