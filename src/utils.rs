//! Utility functions for string processing.

/// Normalize a string for search: lowercase and collapse whitespace.
///
/// Both index text and queries pass through here, so a match is always a
/// case-insensitive comparison of the same normal form.
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word boundary detection: checks if character is a word separator.
fn is_word_boundary(c: char) -> bool {
    !c.is_alphanumeric()
}

/// Split normalized text into search words, dropping empty fragments.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_word_boundary).filter(|w| !w.is_empty())
}

/// Every forward prefix of a word, shortest first: "docs" yields
/// "d", "do", "doc", "docs". Char-aligned, so multi-byte input is safe.
///
/// Indexing all prefixes is what makes incremental (search-as-you-type)
/// queries plain lookups instead of range scans.
pub fn forward_prefixes(word: &str) -> impl Iterator<Item = &str> {
    word.char_indices()
        .map(move |(i, c)| &word[..i + c.len_utf8()])
}

/// Slugify a heading or file stem for use in a deep-link address.
///
/// Lower-cases, replaces every run of characters outside `[a-z0-9-$]` with a
/// single hyphen, then trims leading and trailing hyphens. `$` survives
/// because API headings like `$fetch` must keep their anchor readable.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        let keep = matches!(c, 'a'..='z' | '0'..='9' | '-' | '$');
        if keep {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    while slug.starts_with('-') {
        slug.remove(0);
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  Get   Started \n now"), "get started now");
    }

    #[test]
    fn test_words_split_on_punctuation() {
        let got: Vec<_> = words("get-started, now!").collect();
        assert_eq!(got, vec!["get", "started", "now"]);
    }

    #[test]
    fn test_forward_prefixes() {
        let got: Vec<_> = forward_prefixes("doc").collect();
        assert_eq!(got, vec!["d", "do", "doc"]);
    }

    #[test]
    fn test_forward_prefixes_multibyte() {
        let got: Vec<_> = forward_prefixes("héllo").collect();
        assert_eq!(got[0], "h");
        assert_eq!(got[1], "hé");
        assert_eq!(got.last().unwrap(), &"héllo");
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Get Started"), "get-started");
        assert_eq!(slugify("What's New?"), "what-s-new");
    }

    #[test]
    fn test_slugify_keeps_dollar() {
        assert_eq!(slugify("$fetch and friends"), "$fetch-and-friends");
    }

    #[test]
    fn test_slugify_collapses_runs_and_trims() {
        assert_eq!(slugify("--Weird:::Heading--"), "weird-heading");
        assert_eq!(slugify("   "), "");
    }
}
