//! Object store port and its implementations
//!
//! The namespace layer only ever talks to an [`ObjectStore`]: a flat key/value
//! store that can list keys by prefix (optionally folding at a delimiter),
//! test a key for existence, stream an object out and stream one in.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process map, used by tests and demos
//! - [`LocalStore`]: one file per key in a single directory
//! - [`S3Store`]: Amazon S3 and compatible services (feature `s3-native`)
//!
//! # Example
//!
//! ```no_run
//! use vfolder::backend::{ListRequest, MemoryStore, ObjectStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     store.insert("docs/readme.md", b"hello".to_vec()).await;
//!
//!     let page = store.list_prefix(ListRequest::folder("", '/', 20)).await?;
//!     assert_eq!(page.common_prefixes, vec!["docs/"]);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod listing;
pub mod types;

mod config;
mod local;
mod memory;

#[cfg(feature = "s3-native")]
mod s3;

pub use config::StoreConfig;
pub use error::{BackendError, BackendResult};
pub use listing::fold_listing;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use types::{ListRequest, ObjectBody, PrefixListing, PutOptions};

#[cfg(feature = "s3-native")]
pub use s3::S3Store;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

/// Flat object store with prefix listing
///
/// Implementors must be `Send + Sync`; one instance is shared by every
/// request the service handles.
///
/// Keys are opaque byte-ordered strings. Folders do not exist at this level,
/// only prefixes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of keys under `request.prefix`
    ///
    /// With a delimiter, keys containing the delimiter after the prefix are
    /// folded into `common_prefixes`. `next_cursor` is set iff more entries
    /// follow this page.
    async fn list_prefix(&self, request: ListRequest) -> BackendResult<PrefixListing>;

    /// Check whether an object exists under exactly this key
    ///
    /// A missing key is `Ok(false)`, never an error.
    async fn head_object(&self, key: &str) -> BackendResult<bool>;

    /// Stream an object's bytes into `sink`
    ///
    /// Returns the number of bytes written, or `NotFound` when the key does not
    /// exist.
    async fn get_object(
        &self,
        key: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> BackendResult<u64>;

    /// Store `options.length` bytes read from `body` under `key`
    ///
    /// Replaces any existing object. Returns the number of bytes stored.
    async fn put_object(
        &self,
        key: &str,
        body: ObjectBody,
        options: PutOptions,
    ) -> BackendResult<u64>;

    /// Short name used in errors and logs ("memory", "local", "s3")
    fn backend_name(&self) -> &'static str;
}
