//! Build-time corpus extraction.
//!
//! Walks a directory tree of markdown documents and flattens each into
//! indexable [`SearchNode`](crate::types::SearchNode) blocks: one per
//! document root and one per heading down to four levels of depth, each
//! with its breadcrumb trail and deep-link href. All blocks land in a
//! single `search.json` artifact that the runtime engine ingests once.
//!
//! Extraction failures are build failures: a document without a `title`,
//! or two nodes claiming the same href, abort the run before anything is
//! written. Bad corpora never reach runtime.

pub mod document;
pub mod markdown;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::fetch::CORPUS_FILE;
use crate::types::{SearchBlocks, SearchNode};

pub use document::{load_document, SourceDocument};
pub use markdown::extract_nodes;

/// Errors that abort an extraction run.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: missing required `title` in frontmatter")]
    MissingTitle { path: PathBuf },
    #[error("{path}: invalid frontmatter: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("duplicate href {href}: emitted by both {first} and {second}")]
    DuplicateHref {
        href: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap()
    .progress_chars("━━╸")
}

/// Extract every markdown document under `input_dir` into a single
/// `search.json` in `output_dir`.
///
/// `route_prefix` is the site route the documents live under, `/docs` by
/// convention; every emitted href starts with it.
pub fn run_extract(
    input_dir: &Path,
    output_dir: &Path,
    route_prefix: &str,
) -> Result<(), ExtractError> {
    let sources = collect_sources(input_dir)?;
    if sources.is_empty() {
        eprintln!("⚠️  No markdown documents found; skipping extraction");
        return Ok(());
    }

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(progress_style());
    pb.set_prefix("Extracting");
    pb.set_message("documents...");

    // Per-document extraction is independent; fan out, then stitch the
    // corpus together in deterministic path order.
    let per_document: Vec<(PathBuf, Vec<SearchNode>)> = sources
        .par_iter()
        .map(|path| -> Result<(PathBuf, Vec<SearchNode>), ExtractError> {
            let document = load_document(input_dir, path)?;
            let nodes = extract_nodes(&document, route_prefix);
            pb.inc(1);
            Ok((path.clone(), nodes))
        })
        .collect::<Result<Vec<_>, _>>()?;

    pb.finish_with_message(format!("extracted {} documents", per_document.len()));

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut blocks = Vec::new();
    for (path, nodes) in per_document {
        for node in nodes {
            if let Some(first) = seen.insert(node.href.clone(), path.clone()) {
                return Err(ExtractError::DuplicateHref {
                    href: node.href,
                    first,
                    second: path,
                });
            }
            blocks.push(node);
        }
    }

    let corpus = SearchBlocks { blocks };
    let bytes = serde_json::to_vec(&corpus).expect("corpus serialization is infallible");

    fs::create_dir_all(output_dir).map_err(|source| ExtractError::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let out_path = output_dir.join(CORPUS_FILE);
    fs::write(&out_path, &bytes).map_err(|source| ExtractError::Write {
        path: out_path.clone(),
        source,
    })?;

    eprintln!();
    eprintln!("✅ Extraction complete");
    eprintln!(
        "   {} documents │ {} blocks │ {} bytes → {}",
        sources.len(),
        corpus.blocks.len(),
        bytes.len(),
        out_path.display()
    );

    Ok(())
}

/// All `.md` files under `dir`, recursively, in sorted order so the corpus
/// (and therefore result order) is stable across runs.
fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut found = Vec::new();
    walk(dir, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), ExtractError> {
    let entries = fs::read_dir(dir).map_err(|source| ExtractError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ExtractError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            found.push(path);
        }
    }
    Ok(())
}
