//! Common types for the object store port

use tokio::io::AsyncRead;

/// Boxed object body handed to [`ObjectStore::put_object`](super::ObjectStore::put_object)
pub type ObjectBody = Box<dyn AsyncRead + Unpin + Send>;

/// Parameters of one prefix listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys starting with this prefix are considered
    pub prefix: String,

    /// Fold keys into common prefixes at this character (None = flat listing)
    pub delimiter: Option<char>,

    /// Continuation token from a previous page
    pub cursor: Option<String>,

    /// Maximum number of entries (keys + common prefixes) in the page
    pub page_size: usize,
}

impl ListRequest {
    /// Delimited listing of one folder level
    pub fn folder(prefix: impl Into<String>, delimiter: char, page_size: usize) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: Some(delimiter),
            cursor: None,
            page_size,
        }
    }

    /// Flat listing of everything under a prefix
    pub fn flat(prefix: impl Into<String>, page_size: usize) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: None,
            cursor: None,
            page_size,
        }
    }

    /// Builder pattern: resume from a continuation token
    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// One page returned by a prefix listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixListing {
    /// Immediate sub-prefixes, each ending with the delimiter
    pub common_prefixes: Vec<String>,

    /// Keys that are immediate children of the prefix
    pub keys: Vec<String>,

    /// Token for the next page, `None` when the listing is complete
    pub next_cursor: Option<String>,
}

impl PrefixListing {
    /// Total number of entries in this page
    pub fn len(&self) -> usize {
        self.common_prefixes.len() + self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.common_prefixes.is_empty() && self.keys.is_empty()
    }
}

/// Options for put operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    /// Content type / MIME type stored with the object
    pub content_type: Option<String>,

    /// Exact body length in bytes
    pub length: u64,
}

impl PutOptions {
    pub fn new(length: u64) -> Self {
        Self {
            content_type: None,
            length,
        }
    }

    /// Builder pattern: set content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request_builders() {
        let req = ListRequest::folder("docs/", '/', 20).with_cursor(Some("tok".to_string()));
        assert_eq!(req.delimiter, Some('/'));
        assert_eq!(req.cursor.as_deref(), Some("tok"));

        let req = ListRequest::flat("docs/", 1);
        assert_eq!(req.delimiter, None);
        assert_eq!(req.page_size, 1);
    }

    #[test]
    fn test_prefix_listing_len() {
        let listing = PrefixListing {
            common_prefixes: vec!["a/".to_string()],
            keys: vec!["b".to_string(), "c".to_string()],
            next_cursor: None,
        };
        assert_eq!(listing.len(), 3);
        assert!(!listing.is_empty());
        assert!(PrefixListing::default().is_empty());
    }

    #[test]
    fn test_put_options() {
        let opts = PutOptions::new(12).with_content_type("text/plain");
        assert_eq!(opts.length, 12);
        assert_eq!(opts.content_type.as_deref(), Some("text/plain"));
    }
}
