//! Namespace translator: folders and files over a flat object store
//!
//! Every call is answered from the store's current state. The translator
//! keeps no cache and no per-session data, so it can be shared freely
//! between concurrent requests.

use crate::backend::{BackendError, ListRequest, ObjectBody, ObjectStore, PutOptions};
use crate::error::{Result, StorageError};
use crate::resource::{as_folder_prefix, ListResult, Resource, ResourceType, SEPARATOR};
use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

/// Entries per listing page
pub const PAGE_SIZE: usize = 20;

/// Delimiter used to fold keys into folders
pub const DELIMITER: char = SEPARATOR;

/// Longest resource name carried into a temporary file name
const MAX_SUFFIX_CHARS: usize = 100;

/// Maps the folder/file model onto an [`ObjectStore`]
#[derive(Clone)]
pub struct NamespaceTranslator {
    store: Arc<dyn ObjectStore>,

    /// Directory for transient download files (None = OS temp dir)
    temp_dir: Option<PathBuf>,
}

impl NamespaceTranslator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            temp_dir: None,
        }
    }

    /// Builder pattern: place transient files in `dir`
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Name of the underlying store
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// List the immediate children of `parent` (root when `None` or not a folder)
    ///
    /// Folders come first, then files, each group in store order. The
    /// folder's own placeholder object is never listed as a child.
    pub async fn list_folder(
        &self,
        parent: Option<&Resource>,
        cursor: Option<&str>,
    ) -> Result<ListResult<Resource>> {
        let prefix = match parent {
            Some(res) if res.is_folder() => res.id().to_string(),
            _ => String::new(),
        };
        let cursor = cursor.filter(|c| !c.is_empty()).map(str::to_string);

        debug!(
            "list_prefix prefix={:?} cursor={:?} page_size={} on {}",
            prefix,
            cursor,
            PAGE_SIZE,
            self.backend_name()
        );

        let request = ListRequest::folder(prefix.clone(), DELIMITER, PAGE_SIZE).with_cursor(cursor);
        let listing = self
            .store
            .list_prefix(request)
            .await
            .map_err(|e| self.classify(format!("list {:?}", prefix), e))?;

        let mut resources = Vec::with_capacity(listing.len());
        resources.extend(listing.common_prefixes.into_iter().map(Resource::folder));
        resources.extend(
            listing
                .keys
                .into_iter()
                .filter(|key| *key != prefix)
                .map(Resource::file),
        );

        let cursor = listing.next_cursor.filter(|c| !c.is_empty());
        Ok(ListResult::new(resources, cursor))
    }

    /// Resolve an id to a resource that currently exists
    ///
    /// A trailing separator makes the id a folder. A folder exists iff at
    /// least one key lives under its prefix, its own placeholder included.
    pub async fn get_resource(&self, id: &str) -> Result<Resource> {
        if id.is_empty() {
            return Err(StorageError::invalid_argument("resource id must not be empty"));
        }

        match ResourceType::infer(id) {
            ResourceType::File => {
                debug!("head_object key={:?} on {}", id, self.backend_name());
                let exists = self
                    .store
                    .head_object(id)
                    .await
                    .map_err(|e| self.classify(format!("head {}", id), e))?;

                if exists {
                    Ok(Resource::file(id))
                } else {
                    warn!("File not found: {}", id);
                    Err(StorageError::not_found(id))
                }
            }
            ResourceType::Folder => {
                let prefix = as_folder_prefix(id);
                debug!("probe prefix={:?} on {}", prefix, self.backend_name());
                let probe = self
                    .store
                    .list_prefix(ListRequest::flat(prefix.clone(), 1))
                    .await
                    .map_err(|e| self.classify(format!("probe {}", prefix), e))?;

                if probe.is_empty() {
                    warn!("Folder not found: {}", prefix);
                    Err(StorageError::not_found(prefix))
                } else {
                    Ok(Resource::folder(prefix))
                }
            }
        }
    }

    /// Copy a file's content into a new transient local file
    pub async fn get_as_file(&self, resource: &Resource) -> Result<TransientFile> {
        if resource.is_folder() {
            return Err(StorageError::unsupported(
                "cannot materialize a folder as a file content stream",
            ));
        }

        let context = format!("download {}", resource.id());
        let suffix = temp_suffix(resource.name());
        let staging = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("vfolder-").suffix(&suffix);
            match &self.temp_dir {
                Some(dir) => builder.tempfile_in(dir),
                None => builder.tempfile(),
            }
        }
        .map_err(|e| self.classify(context.clone(), e.into()))?;

        let handle = staging
            .reopen()
            .map_err(|e| self.classify(context.clone(), e.into()))?;
        let mut file = tokio::fs::File::from_std(handle);

        debug!(
            "get_object key={:?} into {} on {}",
            resource.id(),
            staging.path().display(),
            self.backend_name()
        );

        // On any error below `staging` is dropped, which deletes the partial file
        let len = self
            .store
            .get_object(resource.id(), &mut file)
            .await
            .map_err(|e| self.classify(context.clone(), e))?;
        file.flush()
            .await
            .map_err(|e| self.classify(context.clone(), e.into()))?;
        drop(file);

        Ok(TransientFile {
            file: staging,
            len,
            name: resource.name().to_string(),
        })
    }

    /// Store `length` bytes from `content` at `key`, replacing any existing object
    pub async fn upload_file(
        &self,
        key: &str,
        content: ObjectBody,
        content_type: Option<String>,
        length: u64,
    ) -> Result<u64> {
        if key.is_empty() {
            return Err(StorageError::invalid_argument("upload key must not be empty"));
        }
        if length == 0 {
            return Err(StorageError::invalid_argument("uploaded file is empty"));
        }

        let mut options = PutOptions::new(length);
        if let Some(content_type) = content_type {
            options = options.with_content_type(content_type);
        }

        debug!(
            "put_object key={:?} length={} content_type={:?} on {}",
            key,
            length,
            options.content_type,
            self.backend_name()
        );

        self.store
            .put_object(key, content, options)
            .await
            .map_err(|e| self.classify(format!("upload {}", key), e))
    }

    fn classify(&self, context: String, err: BackendError) -> StorageError {
        if err.is_not_found() {
            warn!("{}: {}", context, err);
        } else {
            error!("{} failed on {}: {}", context, self.backend_name(), err);
        }
        StorageError::from_backend(context, err)
    }
}

fn temp_suffix(name: &str) -> String {
    let short: String = name.chars().take(MAX_SUFFIX_CHARS).collect();
    format!("-{}", short)
}

/// Local temporary copy of an object
///
/// The file is deleted when this value (or the stream made from it) is
/// dropped, whichever path the caller takes.
#[derive(Debug)]
pub struct TransientFile {
    file: NamedTempFile,
    len: u64,
    name: String,
}

impl TransientFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Content length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Name of the resource this file was materialized from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stream the content; the file lives until the stream is dropped
    pub fn into_stream(self) -> io::Result<TransientStream> {
        let handle = self.file.reopen()?;
        Ok(TransientStream {
            inner: ReaderStream::new(tokio::fs::File::from_std(handle)),
            _guard: self.file,
        })
    }

    /// Take over the file; it will no longer be deleted automatically
    pub fn keep(self) -> io::Result<PathBuf> {
        self.file
            .keep()
            .map(|(_, path)| path)
            .map_err(|e| e.error)
    }
}

/// Byte stream over a [`TransientFile`]
pub struct TransientStream {
    inner: ReaderStream<tokio::fs::File>,
    _guard: NamedTempFile,
}

impl Stream for TransientStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
