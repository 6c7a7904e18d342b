//! Prefix/delimiter folding over a sorted key set
//!
//! Stores without a native listing API (memory, local disk) share this
//! implementation of ListObjectsV2-style semantics: keys under the prefix are
//! visited in byte order, keys with a further delimiter roll up into one
//! common prefix, and a page closes after `page_size` entries.

use super::error::{BackendError, BackendResult};
use super::types::{ListRequest, PrefixListing};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

const PREFIX_MARKER: char = 'p';
const KEY_MARKER: char = 'k';

/// One emitted listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Prefix(String),
    Key(String),
}

impl Entry {
    fn classify(key: &str, prefix: &str, delimiter: Option<char>) -> Self {
        let rest = &key[prefix.len()..];
        match delimiter.and_then(|d| rest.find(d).map(|idx| idx + d.len_utf8())) {
            Some(end) => Entry::Prefix(key[..prefix.len() + end].to_string()),
            None => Entry::Key(key.to_string()),
        }
    }

    /// Whether a key was already returned by a page ending at this entry
    fn covers(&self, key: &str) -> bool {
        match self {
            Entry::Key(last) => key <= last.as_str(),
            Entry::Prefix(last) => key <= last.as_str() || key.starts_with(last.as_str()),
        }
    }

    fn encode(&self) -> String {
        let raw = match self {
            Entry::Prefix(p) => format!("{}{}", PREFIX_MARKER, p),
            Entry::Key(k) => format!("{}{}", KEY_MARKER, k),
        };
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    fn decode(backend: &str, token: &str) -> BackendResult<Self> {
        let invalid = || {
            BackendError::rejected(
                backend,
                "InvalidContinuationToken",
                format!("The continuation token provided is incorrect: {}", token),
            )
            .with_status(400)
        };

        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let mut chars = raw.chars();
        match chars.next() {
            Some(PREFIX_MARKER) => Ok(Entry::Prefix(chars.as_str().to_string())),
            Some(KEY_MARKER) => Ok(Entry::Key(chars.as_str().to_string())),
            _ => Err(invalid()),
        }
    }
}

/// Fold a byte-ordered key sequence into one listing page
///
/// `keys` must be sorted ascending; it may contain keys outside the prefix.
pub fn fold_listing<'a, I>(
    backend: &str,
    keys: I,
    request: &ListRequest,
) -> BackendResult<PrefixListing>
where
    I: IntoIterator<Item = &'a str>,
{
    let resume = match request.cursor.as_deref() {
        Some(token) if !token.is_empty() => Some(Entry::decode(backend, token)?),
        _ => None,
    };

    let prefix = request.prefix.as_str();
    let page_size = request.page_size.max(1);
    let mut listing = PrefixListing::default();
    let mut last: Option<Entry> = None;
    let mut emitted = 0usize;

    for key in keys {
        if !key.starts_with(prefix) {
            if key > prefix {
                // Sorted input: nothing further can match
                break;
            }
            continue;
        }

        if resume.as_ref().is_some_and(|r| r.covers(key)) {
            continue;
        }

        let entry = Entry::classify(key, prefix, request.delimiter);
        if last.as_ref() == Some(&entry) {
            continue;
        }

        if emitted == page_size {
            listing.next_cursor = last.as_ref().map(Entry::encode);
            break;
        }

        match &entry {
            Entry::Prefix(p) => listing.common_prefixes.push(p.clone()),
            Entry::Key(k) => listing.keys.push(k.clone()),
        }
        emitted += 1;
        last = Some(entry);
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(keys: &[&str]) -> Vec<String> {
        let mut keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        keys.sort();
        keys
    }

    fn fold(keys: &[String], request: &ListRequest) -> PrefixListing {
        fold_listing("test", keys.iter().map(String::as_str), request).unwrap()
    }

    #[test]
    fn test_delimited_listing_folds_subfolders() {
        let keys = sorted(&[
            "docs/a.txt",
            "docs/b.txt",
            "docs/img/1.png",
            "docs/img/2.png",
            "docs/img/raw/3.raw",
            "other/x.txt",
            "root.txt",
        ]);

        let listing = fold(&keys, &ListRequest::folder("docs/", '/', 20));
        assert_eq!(listing.common_prefixes, vec!["docs/img/"]);
        assert_eq!(listing.keys, vec!["docs/a.txt", "docs/b.txt"]);
        assert_eq!(listing.next_cursor, None);

        let root = fold(&keys, &ListRequest::folder("", '/', 20));
        assert_eq!(root.common_prefixes, vec!["docs/", "other/"]);
        assert_eq!(root.keys, vec!["root.txt"]);
    }

    #[test]
    fn test_flat_listing_returns_all_keys() {
        let keys = sorted(&["a/1", "a/b/2", "a/b/c/3", "b/4"]);
        let listing = fold(&keys, &ListRequest::flat("a/", 10));
        assert!(listing.common_prefixes.is_empty());
        assert_eq!(listing.keys, vec!["a/1", "a/b/2", "a/b/c/3"]);
    }

    #[test]
    fn test_placeholder_key_is_listed_as_key() {
        let keys = sorted(&["docs/", "docs/a.txt"]);
        let listing = fold(&keys, &ListRequest::folder("docs/", '/', 20));
        assert_eq!(listing.keys, vec!["docs/", "docs/a.txt"]);
    }

    #[test]
    fn test_pagination_over_keys() {
        let names: Vec<String> = (1..=25).map(|i| format!("p/file-{:02}.txt", i)).collect();
        let keys = sorted(&names.iter().map(String::as_str).collect::<Vec<_>>());

        let first = fold(&keys, &ListRequest::folder("p/", '/', 20));
        assert_eq!(first.len(), 20);
        let cursor = first.next_cursor.clone().expect("first page must be truncated");

        let second = fold(
            &keys,
            &ListRequest::folder("p/", '/', 20).with_cursor(Some(cursor)),
        );
        assert_eq!(second.len(), 5);
        assert_eq!(second.keys.first().map(String::as_str), Some("p/file-21.txt"));
        assert_eq!(second.next_cursor, None);
    }

    #[test]
    fn test_exact_page_has_no_cursor() {
        let keys = sorted(&["k/1", "k/2", "k/3"]);
        let listing = fold(&keys, &ListRequest::folder("k/", '/', 3));
        assert_eq!(listing.len(), 3);
        assert_eq!(listing.next_cursor, None);
    }

    #[test]
    fn test_cursor_after_common_prefix_skips_its_contents() {
        let keys = sorted(&["a/1", "a/2", "a/3", "b/1", "c.txt"]);

        let first = fold(&keys, &ListRequest::folder("", '/', 1));
        assert_eq!(first.common_prefixes, vec!["a/"]);

        let second = fold(
            &keys,
            &ListRequest::folder("", '/', 1).with_cursor(first.next_cursor),
        );
        assert_eq!(second.common_prefixes, vec!["b/"]);

        let third = fold(
            &keys,
            &ListRequest::folder("", '/', 1).with_cursor(second.next_cursor),
        );
        assert_eq!(third.keys, vec!["c.txt"]);
        assert_eq!(third.next_cursor, None);
    }

    #[test]
    fn test_empty_cursor_means_first_page() {
        let keys = sorted(&["x", "y"]);
        let listing = fold(
            &keys,
            &ListRequest::folder("", '/', 20).with_cursor(Some(String::new())),
        );
        assert_eq!(listing.keys, vec!["x", "y"]);
    }

    #[test]
    fn test_invalid_cursor_is_rejected() {
        let keys = sorted(&["x"]);
        let request = ListRequest::folder("", '/', 20).with_cursor(Some("!!not-base64".into()));
        let err = fold_listing("test", keys.iter().map(String::as_str), &request).unwrap_err();
        assert!(matches!(
            err,
            BackendError::Rejected { status: Some(400), .. }
        ));
    }

    #[test]
    fn test_empty_store() {
        let keys: Vec<String> = Vec::new();
        let listing = fold(&keys, &ListRequest::folder("", '/', 20));
        assert!(listing.is_empty());
        assert_eq!(listing.next_cursor, None);
    }
}
