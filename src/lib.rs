/*!
 * vfolder - folders and files over flat object stores
 *
 * Presents a hierarchical, browsable namespace on top of stores that only
 * know flat keys:
 * - Folder listing by prefix and delimiter, paginated by continuation token
 * - Existence checks for files and virtual folders
 * - Downloads materialized into self-cleaning temporary files
 * - Uploads with unconditional overwrite
 * - Pluggable stores: in-memory, local directory, S3 and compatibles
 *
 * Version: 0.3.0
 * Author: Shane Wall <shaneawall@gmail.com>
 */

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod resource;
pub mod service;
pub mod translator;

// Re-export commonly used types
pub use backend::{ObjectStore, StoreConfig};
pub use config::{LogLevel, ServiceConfig};
pub use error::{ErrorKind, Result, StorageError};
pub use resource::{extract_name, ListResult, Resource, ResourceType};
pub use service::FileService;
pub use translator::{NamespaceTranslator, TransientFile, PAGE_SIZE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }
}
