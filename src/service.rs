//! File service facade
//!
//! The contract the HTTP layer is written against. Each method logs the
//! request and delegates to the shared [`NamespaceTranslator`].

use crate::backend::ObjectBody;
use crate::error::{Result, StorageError};
use crate::resource::{ListResult, Resource};
use crate::translator::{NamespaceTranslator, TransientFile};
use std::sync::Arc;
use tracing::info;

/// Cheaply clonable handle on the namespace
#[derive(Clone)]
pub struct FileService {
    translator: Arc<NamespaceTranslator>,
}

impl FileService {
    pub fn new(translator: NamespaceTranslator) -> Self {
        Self {
            translator: Arc::new(translator),
        }
    }

    /// Name of the store behind this service
    pub fn backend_name(&self) -> &'static str {
        self.translator.backend_name()
    }

    /// List the top level of the store
    pub async fn list_root(&self, cursor: Option<&str>) -> Result<ListResult<Resource>> {
        info!("List root (cursor: {})", cursor.unwrap_or("-"));
        self.translator.list_folder(None, cursor).await
    }

    /// List a folder after checking that it exists
    pub async fn list_folder(
        &self,
        folder_id: &str,
        cursor: Option<&str>,
    ) -> Result<ListResult<Resource>> {
        info!("List folder {} (cursor: {})", folder_id, cursor.unwrap_or("-"));
        let folder = self.translator.get_resource(folder_id).await?;
        if !folder.is_folder() {
            return Err(StorageError::unsupported(format!(
                "{} is a file and cannot be listed",
                folder.id()
            )));
        }
        self.translator.list_folder(Some(&folder), cursor).await
    }

    pub async fn get_resource(&self, id: &str) -> Result<Resource> {
        info!("Get resource {}", id);
        self.translator.get_resource(id).await
    }

    /// Resolve a file and copy it into a transient local file
    pub async fn download(&self, id: &str) -> Result<(Resource, TransientFile)> {
        info!("Download {}", id);
        let resource = self.translator.get_resource(id).await?;
        let file = self.translator.get_as_file(&resource).await?;
        Ok((resource, file))
    }

    pub async fn upload_file(
        &self,
        key: &str,
        content: ObjectBody,
        content_type: Option<String>,
        length: u64,
    ) -> Result<u64> {
        info!(
            "Upload {} ({} bytes, {})",
            key,
            length,
            content_type.as_deref().unwrap_or("no content type")
        );
        self.translator
            .upload_file(key, content, content_type, length)
            .await
    }

    pub async fn get_as_file(&self, resource: &Resource) -> Result<TransientFile> {
        info!("Materialize {}", resource.id());
        self.translator.get_as_file(resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::error::ErrorKind;

    async fn service_with(keys: &[&str]) -> FileService {
        let store = MemoryStore::new();
        for key in keys {
            store.insert(*key, b"content".to_vec()).await;
        }
        FileService::new(NamespaceTranslator::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn test_list_folder_requires_existing_folder() {
        let service = service_with(&["docs/a.txt"]).await;

        let page = service.list_folder("docs/", None).await.unwrap();
        assert_eq!(page.resources, vec![Resource::file("docs/a.txt")]);

        let err = service.list_folder("nothing/", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_folder_on_file_is_unsupported() {
        let service = service_with(&["docs/a.txt"]).await;
        let err = service.list_folder("docs/a.txt", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[tokio::test]
    async fn test_download_folder_is_unsupported() {
        let service = service_with(&["docs/a.txt"]).await;
        let err = service.download("docs/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[tokio::test]
    async fn test_download_file() {
        let service = service_with(&["docs/a.txt"]).await;
        let (resource, file) = service.download("docs/a.txt").await.unwrap();
        assert_eq!(resource.name(), "a.txt");
        assert_eq!(file.len(), 7);
        assert_eq!(file.name(), "a.txt");
    }
}
