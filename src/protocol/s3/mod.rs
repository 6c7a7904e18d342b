//! Native S3 protocol support
//!
//! Uses the official AWS SDK for Rust against AWS S3 or any S3-compatible
//! service (MinIO, LocalStack, Ceph RGW).
//!
//! [`S3Config`] is always available so configuration files parse the same
//! way on every build. The client itself needs the `s3-native` feature.
//!
//! # Using MinIO
//!
//! ```no_run
//! # #[cfg(feature = "s3-native")]
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use vfolder::protocol::s3::{S3Client, S3Config};
//!
//! let config = S3Config::new("files".to_string())
//!     .with_region("us-east-1")
//!     .with_endpoint("http://localhost:9000")
//!     .with_credentials("minioadmin", "minioadmin");
//!
//! let client = S3Client::new(config).await?;
//! client.test_connection().await?;
//! # Ok(())
//! # }
//! ```

mod config;

#[cfg(feature = "s3-native")]
mod client;

#[cfg(feature = "s3-native")]
mod error;


pub use config::S3Config;

#[cfg(feature = "s3-native")]
pub use client::S3Client;

/// Default per-operation timeout
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;
