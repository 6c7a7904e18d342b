//! In-memory object store
//!
//! Keeps every object in a byte-ordered map so listings come out in the same
//! order S3 would produce them. Useful for tests and for running the service
//! without any external storage.

use super::error::{BackendError, BackendResult};
use super::listing::fold_listing;
use super::types::{ListRequest, ObjectBody, PrefixListing, PutOptions};
use super::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;

const BACKEND: &str = "memory";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
}

/// Object store backed by a shared in-process map
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, bypassing `put_object`
    pub async fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        self.objects.write().await.insert(
            key.into(),
            StoredObject {
                data: data.into(),
                content_type: None,
            },
        );
    }

    /// Object bytes, if the key exists
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|o| o.data.clone())
    }

    /// Content type recorded at upload time
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .and_then(|o| o.content_type.clone())
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_prefix(&self, request: ListRequest) -> BackendResult<PrefixListing> {
        let objects = self.objects.read().await;
        let keys = objects
            .range::<str, _>((Bound::Included(request.prefix.as_str()), Bound::Unbounded))
            .map(|(k, _)| k.as_str());
        fold_listing(BACKEND, keys, &request)
    }

    async fn head_object(&self, key: &str) -> BackendResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn get_object(
        &self,
        key: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> BackendResult<u64> {
        // Clone the handle so the lock is not held across the write
        let data = self
            .get(key)
            .await
            .ok_or_else(|| BackendError::not_found(BACKEND, key))?;

        sink.write_all(&data).await?;
        sink.flush().await?;
        Ok(data.len() as u64)
    }

    async fn put_object(
        &self,
        key: &str,
        body: ObjectBody,
        options: PutOptions,
    ) -> BackendResult<u64> {
        let mut data = Vec::with_capacity(options.length.min(8 * 1024 * 1024) as usize);
        body.take(options.length).read_to_end(&mut data).await?;

        if data.len() as u64 != options.length {
            return Err(BackendError::rejected(
                BACKEND,
                "IncompleteBody",
                format!(
                    "expected {} bytes, body ended after {}",
                    options.length,
                    data.len()
                ),
            )
            .with_status(400));
        }

        let written = data.len() as u64;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data: Bytes::from(data),
                content_type: options.content_type,
            },
        );
        Ok(written)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}
