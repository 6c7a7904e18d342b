//! Store selection and construction
//!
//! The `[store]` table of the service config picks one implementation by
//! `kind`. The store is built once at startup and shared by every request.

use super::error::{BackendError, BackendResult};
use super::{LocalStore, MemoryStore, ObjectStore};
use crate::protocol::s3::S3Config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Unified store configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-process store, contents are lost on exit
    #[default]
    Memory,

    /// One file per key inside `root`
    Local {
        /// Directory holding the objects
        root: PathBuf,
    },

    /// S3-compatible storage
    S3(S3Config),
}

impl StoreConfig {
    /// Create a local store configuration
    pub fn local<P: Into<PathBuf>>(root: P) -> Self {
        Self::Local { root: root.into() }
    }

    /// Create S3 store configuration
    pub fn s3(config: S3Config) -> Self {
        Self::S3(config)
    }

    /// Get store type name
    pub fn backend_type(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Local { .. } => "local",
            Self::S3(_) => "s3",
        }
    }

    /// Check the configuration without touching the store
    pub fn validate(&self) -> BackendResult<()> {
        match self {
            Self::Memory => Ok(()),
            Self::Local { root } if root.as_os_str().is_empty() => {
                Err(BackendError::InvalidConfig {
                    backend: "local".to_string(),
                    message: "root must not be empty".to_string(),
                })
            }
            Self::Local { .. } => Ok(()),
            Self::S3(config) => config.validate(),
        }
    }

    /// Build the configured store
    pub async fn open(&self) -> BackendResult<Arc<dyn ObjectStore>> {
        self.validate()?;
        tracing::info!("Opening {} store", self.backend_type());

        match self {
            Self::Memory => Ok(Arc::new(MemoryStore::new())),
            Self::Local { root } => Ok(Arc::new(LocalStore::open(root.clone()).await?)),
            #[cfg(feature = "s3-native")]
            Self::S3(config) => Ok(Arc::new(super::S3Store::new(config.clone()).await?)),
            #[cfg(not(feature = "s3-native"))]
            Self::S3(_) => Err(BackendError::InvalidConfig {
                backend: "s3".to_string(),
                message: "built without the s3-native feature".to_string(),
            }),
        }
    }

    /// Apply `VFOLDER_STORE`, `VFOLDER_LOCAL_ROOT` and `VFOLDER_S3_*` overrides
    ///
    /// `lookup` returns the value of an environment variable, if set.
    pub fn apply_env<F>(&mut self, lookup: F) -> BackendResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("VFOLDER_STORE") {
            let kind = kind.to_lowercase();
            if kind != self.backend_type() {
                *self = match kind.as_str() {
                    "memory" => Self::Memory,
                    "local" => Self::local("./data"),
                    "s3" => Self::S3(S3Config::default()),
                    other => {
                        return Err(BackendError::InvalidConfig {
                            backend: other.to_string(),
                            message: format!("Unsupported store kind: {}", other),
                        })
                    }
                };
            }
        }

        match self {
            Self::Memory => {}
            Self::Local { root } => {
                if let Some(value) = lookup("VFOLDER_LOCAL_ROOT") {
                    *root = PathBuf::from(value);
                }
            }
            Self::S3(config) => {
                if let Some(bucket) = lookup("VFOLDER_S3_BUCKET") {
                    config.bucket = bucket;
                }
                if let Some(region) = lookup("VFOLDER_S3_REGION") {
                    config.region = Some(region);
                }
                if let Some(endpoint) = lookup("VFOLDER_S3_ENDPOINT") {
                    config.endpoint = Some(endpoint);
                    config.force_path_style = true;
                }
                if let Some(access_key) = lookup("VFOLDER_S3_ACCESS_KEY") {
                    config.access_key = Some(access_key);
                }
                if let Some(secret_key) = lookup("VFOLDER_S3_SECRET_KEY") {
                    config.secret_key = Some(secret_key);
                }
            }
        }

        Ok(())
    }
}
