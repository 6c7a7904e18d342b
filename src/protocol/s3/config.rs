//! Configuration types for the S3 client

use crate::backend::{BackendError, BackendResult};
use serde::{Deserialize, Serialize};

/// S3 client configuration
///
/// Deserializes from the `[store]` table of the service config when
/// `kind = "s3"`. Everything but the bucket is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,

    /// AWS region (e.g., "us-east-1")
    pub region: Option<String>,

    /// Custom endpoint URL (for S3-compatible services like MinIO)
    pub endpoint: Option<String>,

    /// AWS access key ID (optional - uses credential chain if not provided)
    pub access_key: Option<String>,

    /// AWS secret access key (optional - uses credential chain if not provided)
    pub secret_key: Option<String>,

    /// Session token (for temporary credentials)
    pub session_token: Option<String>,

    /// Path-style addressing (required for MinIO and LocalStack)
    pub force_path_style: bool,

    /// Per-operation timeout in seconds
    pub timeout_seconds: u64,

    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for S3Config {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl S3Config {
    /// Create a new S3 config with required parameters
    pub fn new(bucket: String) -> Self {
        Self {
            bucket,
            region: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            force_path_style: false,
            timeout_seconds: super::DEFAULT_TIMEOUT_SECONDS,
            max_retries: super::DEFAULT_MAX_RETRIES,
        }
    }

    /// Builder pattern: set region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder pattern: set a custom endpoint, switching to path-style addressing
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self.force_path_style = true;
        self
    }

    /// Builder pattern: set explicit credentials
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> BackendResult<()> {
        if self.bucket.is_empty() {
            return Err(invalid("Bucket name cannot be empty".to_string()));
        }

        if !is_valid_bucket_name(&self.bucket) {
            return Err(invalid(format!(
                "Invalid bucket name: {}. Bucket names must be 3-63 characters, \
                 lowercase letters, numbers, hyphens, and periods only",
                self.bucket
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(invalid("timeout_seconds must be at least 1".to_string()));
        }

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(invalid(
                "Both access_key and secret_key must be provided together".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if using custom endpoint (S3-compatible service)
    pub fn is_custom_endpoint(&self) -> bool {
        self.endpoint.is_some()
    }
}

fn invalid(message: String) -> BackendError {
    BackendError::InvalidConfig {
        backend: "s3".to_string(),
        message,
    }
}

/// Validate S3 bucket name according to AWS rules
fn is_valid_bucket_name(name: &str) -> bool {
    if !(3..=63).contains(&name.len()) {
        return false;
    }

    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !edge_ok(name.chars().next()) || !edge_ok(name.chars().last()) {
        return false;
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return false;
    }

    if name.contains("..") {
        return false;
    }

    // Cannot be formatted as IP address
    if name.split('.').count() == 4 && name.split('.').all(|s| s.parse::<u8>().is_ok()) {
        return false;
    }

    true
}
