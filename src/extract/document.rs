//! Source document loading: frontmatter plus markdown body.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use super::ExtractError;
use crate::utils::slugify;

/// A markdown document ready for extraction.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Route slug derived from the file path, e.g. `guide/get-started`.
    pub slug: String,
    /// Document title from frontmatter. Required; extraction aborts
    /// without it.
    pub title: String,
    /// Markdown body with the frontmatter stripped.
    pub body: String,
}

/// The frontmatter fields extraction cares about. Everything else in the
/// frontmatter (description, navigation flags, ...) belongs to the site
/// renderer and is ignored here.
#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    #[serde(default)]
    title: Option<String>,
}

/// Load one document from `path`, which must live under `root`.
pub fn load_document(root: &Path, path: &Path) -> Result<SourceDocument, ExtractError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (frontmatter, body) = split_frontmatter(&raw);
    let frontmatter: Frontmatter = match frontmatter {
        Some(raw) => serde_yaml::from_str(raw).map_err(|source| ExtractError::Frontmatter {
            path: path.to_path_buf(),
            source,
        })?,
        None => Frontmatter::default(),
    };
    let title = frontmatter
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ExtractError::MissingTitle {
            path: path.to_path_buf(),
        })?;

    Ok(SourceDocument {
        slug: document_slug(root, path),
        title,
        body: body.to_string(),
    })
}

/// Split YAML frontmatter (`---` fenced, at the very top) from the body.
/// Returns `(frontmatter, body)`; no frontmatter means the whole input is
/// body.
fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let rest = if let Some(rest) = raw.strip_prefix("---\n") {
        rest
    } else if let Some(rest) = raw.strip_prefix("---\r\n") {
        rest
    } else {
        return (None, raw);
    };

    for close in ["\n---\n", "\n---\r\n", "\r\n---\n", "\r\n---\r\n"] {
        if let Some(pos) = rest.find(close) {
            return (Some(&rest[..pos]), &rest[pos + close.len()..]);
        }
    }
    // Unterminated fence: treat everything as body, the way a renderer
    // would show it.
    (None, raw)
}

/// Route slug for a document file: relative path components, slugified,
/// joined with `/`. `docs/guide/Get Started.md` under root `docs` becomes
/// `guide/get-started`.
fn document_slug(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut stemmed = PathBuf::from(relative);
    stemmed.set_extension("");
    stemmed
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(slugify(&part.to_string_lossy())),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
