//! S3 object store
//!
//! Thin adapter from [`ObjectStore`] to the native S3 client. S3 already
//! speaks prefix/delimiter listing, so pages and continuation tokens come
//! straight from ListObjectsV2.

use super::error::BackendResult;
use super::types::{ListRequest, ObjectBody, PrefixListing, PutOptions};
use super::ObjectStore;
use crate::protocol::s3::{S3Client, S3Config};
use async_trait::async_trait;
use tokio::io::AsyncWrite;

/// S3 object store adapter
///
/// # Example
///
/// ```no_run
/// use vfolder::backend::{ObjectStore, S3Store};
/// use vfolder::protocol::s3::S3Config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = S3Config::new("my-bucket".to_string()).with_region("us-east-1");
///     let store = S3Store::new(config).await?;
///     println!("exists: {}", store.head_object("docs/readme.md").await?);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    /// Create a new S3 store from configuration
    pub async fn new(config: S3Config) -> BackendResult<Self> {
        let client = S3Client::new(config).await?;
        tracing::info!(
            "S3 store ready for bucket {} (custom endpoint: {})",
            client.bucket(),
            client.config().is_custom_endpoint()
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_prefix(&self, request: ListRequest) -> BackendResult<PrefixListing> {
        self.client
            .list_page(
                &request.prefix,
                request.delimiter,
                request.cursor,
                request.page_size.max(1),
            )
            .await
    }

    async fn head_object(&self, key: &str) -> BackendResult<bool> {
        self.client.exists(key).await
    }

    async fn get_object(
        &self,
        key: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> BackendResult<u64> {
        self.client.download_to(key, sink).await
    }

    async fn put_object(
        &self,
        key: &str,
        body: ObjectBody,
        options: PutOptions,
    ) -> BackendResult<u64> {
        self.client.upload_from(key, body, options).await
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_bucket_fails_before_network() {
        let err = S3Store::new(S3Config::new("Bad_Bucket".to_string()))
            .await
            .err()
            .expect("invalid bucket must be rejected");
        assert!(matches!(
            err,
            crate::backend::BackendError::InvalidConfig { .. }
        ));
    }
}
