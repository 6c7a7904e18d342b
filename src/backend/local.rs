//! Local directory object store
//!
//! Stores each object as one file directly inside a root directory. The file
//! name is the hex encoding of the key, so keys containing separators, dots or
//! any other byte never turn into real subdirectories and never escape the root.

use super::error::{BackendError, BackendResult};
use super::listing::fold_listing;
use super::types::{ListRequest, ObjectBody, PrefixListing, PutOptions};
use super::ObjectStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

const BACKEND: &str = "local";

/// Longest key whose hex encoding still fits a single file name
pub const MAX_KEY_LEN: usize = 127;

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub async fn open<P: Into<PathBuf>>(root: P) -> BackendResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;

        let meta = fs::metadata(&root).await?;
        if !meta.is_dir() {
            return Err(BackendError::InvalidConfig {
                backend: BACKEND.to_string(),
                message: format!("{} is not a directory", root.display()),
            });
        }

        tracing::debug!("Local store opened at {}", root.display());
        Ok(Self { root })
    }

    /// Root directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> BackendResult<PathBuf> {
        if key.len() > MAX_KEY_LEN {
            return Err(BackendError::rejected(
                BACKEND,
                "KeyTooLongError",
                format!("key is {} bytes, limit is {}", key.len(), MAX_KEY_LEN),
            )
            .with_status(400));
        }
        Ok(self.root.join(hex::encode(key.as_bytes())))
    }

    /// Decode every stored key, skipping files this store did not write
    async fn stored_keys(&self) -> BackendResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut read_dir = fs::read_dir(&self.root).await?;

        while let Some(entry) = read_dir.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let Ok(bytes) = hex::decode(&name) else {
                continue;
            };
            let Ok(key) = String::from_utf8(bytes) else {
                continue;
            };
            if entry.file_type().await?.is_file() {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn list_prefix(&self, request: ListRequest) -> BackendResult<PrefixListing> {
        let keys = self.stored_keys().await?;
        fold_listing(BACKEND, keys.iter().map(String::as_str), &request)
    }

    async fn head_object(&self, key: &str) -> BackendResult<bool> {
        let path = self.object_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_object(
        &self,
        key: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> BackendResult<u64> {
        let path = self.object_path(key)?;
        let mut file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                BackendError::not_found(BACKEND, key)
            } else {
                BackendError::from(e)
            }
        })?;

        let copied = tokio::io::copy(&mut file, sink).await?;
        sink.flush().await?;
        Ok(copied)
    }

    async fn put_object(
        &self,
        key: &str,
        body: ObjectBody,
        options: PutOptions,
    ) -> BackendResult<u64> {
        let path = self.object_path(key)?;

        // Write to a sibling first; the dot prefix keeps it out of listings
        let staging = tempfile::Builder::new()
            .prefix(".put-")
            .tempfile_in(&self.root)?;
        let mut file = fs::File::from_std(staging.reopen()?);

        let written = tokio::io::copy(&mut body.take(options.length), &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        if written != options.length {
            return Err(BackendError::rejected(
                BACKEND,
                "IncompleteBody",
                format!(
                    "expected {} bytes, body ended after {}",
                    options.length, written
                ),
            )
            .with_status(400));
        }

        staging.persist(&path).map_err(|e| BackendError::Io(e.error))?;
        tracing::trace!("Stored {} bytes under {}", written, key);
        Ok(written)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn body(data: &[u8]) -> ObjectBody {
        Box::new(Cursor::new(data.to_vec()))
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        let written = store
            .put_object("dir/file.txt", body(b"test data"), PutOptions::new(9))
            .await
            .unwrap();
        assert_eq!(written, 9);

        let mut out = Vec::new();
        store.get_object("dir/file.txt", &mut out).await.unwrap();
        assert_eq!(out, b"test data");

        // No real subdirectory was created for the separator
        assert!(!temp_dir.path().join("dir").exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        store
            .put_object("k", body(b"first"), PutOptions::new(5))
            .await
            .unwrap();
        store
            .put_object("k", body(b"second"), PutOptions::new(6))
            .await
            .unwrap();

        let mut out = Vec::new();
        store.get_object("k", &mut out).await.unwrap();
        assert_eq!(out, b"second");
    }

    #[tokio::test]
    async fn test_head_and_missing_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        assert!(!store.head_object("missing").await.unwrap());
        let mut out = Vec::new();
        assert!(store
            .get_object("missing", &mut out)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_listing_ignores_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        store
            .put_object("a/1.txt", body(b"1"), PutOptions::new(1))
            .await
            .unwrap();
        store
            .put_object("b.txt", body(b"2"), PutOptions::new(1))
            .await
            .unwrap();
        std::fs::write(temp_dir.path().join("not-hex.txt"), b"junk").unwrap();
        std::fs::create_dir(temp_dir.path().join("6162")).unwrap();

        let page = store
            .list_prefix(ListRequest::folder("", '/', 20))
            .await
            .unwrap();
        assert_eq!(page.common_prefixes, vec!["a/"]);
        assert_eq!(page.keys, vec!["b.txt"]);
    }

    #[tokio::test]
    async fn test_short_body_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        let err = store
            .put_object("k", body(b"abc"), PutOptions::new(10))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(!store.head_object("k").await.unwrap());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_overlong_key_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        let key = "x".repeat(MAX_KEY_LEN + 1);
        let err = store.head_object(&key).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { status: Some(400), .. }));
    }
}
