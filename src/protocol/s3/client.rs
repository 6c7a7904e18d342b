//! S3 client implementation

use super::config::S3Config;
use super::error::{is_missing_object, map_get_error, map_sdk_error};
use crate::backend::{BackendError, BackendResult, ObjectBody, PrefixListing, PutOptions};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as AwsS3Client;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// S3 client for AWS S3 and S3-compatible storage
#[derive(Clone)]
pub struct S3Client {
    /// AWS S3 client
    client: AwsS3Client,

    /// Client configuration
    config: S3Config,
}

impl S3Client {
    /// Create a new S3 client with the given configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use vfolder::protocol::s3::{S3Client, S3Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = S3Config::new("my-bucket".to_string());
    ///     let client = S3Client::new(config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: S3Config) -> BackendResult<Self> {
        config.validate()?;
        let client = Self::build_aws_client(&config).await;
        Ok(Self { client, config })
    }

    /// Build the AWS SDK S3 client from configuration
    async fn build_aws_client(config: &S3Config) -> AwsS3Client {
        let mut aws_config_loader = aws_config::defaults(BehaviorVersion::latest());

        let region_provider = if let Some(region_str) = &config.region {
            RegionProviderChain::first_try(Region::new(region_str.clone()))
        } else {
            RegionProviderChain::default_provider().or_else(Region::new("us-east-1"))
        };
        aws_config_loader = aws_config_loader.region(region_provider);

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                config.session_token.clone(),
                None,
                "vfolder-s3-explicit",
            );
            aws_config_loader = aws_config_loader.credentials_provider(credentials);
        }

        let aws_config = aws_config_loader.load().await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.timeout_seconds))
            .build();
        s3_config_builder = s3_config_builder
            .timeout_config(timeout_config)
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_retries + 1));

        AwsS3Client::from_conf(s3_config_builder.build())
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Test the connection by heading the bucket
    pub async fn test_connection(&self) -> BackendResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    /// One ListObjectsV2 page
    pub async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<char>,
        continuation_token: Option<String>,
        max_keys: usize,
    ) -> BackendResult<PrefixListing> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(self.bucket())
            .prefix(prefix)
            .max_keys(i32::try_from(max_keys).unwrap_or(i32::MAX));

        if let Some(delimiter) = delimiter {
            request = request.delimiter(delimiter.to_string());
        }

        if let Some(token) = continuation_token.filter(|t| !t.is_empty()) {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(map_sdk_error)?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_string))
            .collect();

        let common_prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|cp| cp.prefix().map(str::to_string))
            .collect();

        let next_cursor = if response.is_truncated().unwrap_or(false) {
            response
                .next_continuation_token()
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        } else {
            None
        };

        Ok(PrefixListing {
            common_prefixes,
            keys,
            next_cursor,
        })
    }

    /// Check if an object exists in the bucket
    pub async fn exists(&self, key: &str) -> BackendResult<bool> {
        match self
            .client
            .head_object()
            .bucket(self.bucket())
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_missing_object(&e) => Ok(false),
            Err(e) => Err(map_sdk_error(e)),
        }
    }

    /// Stream an object into `sink`
    pub async fn download_to(
        &self,
        key: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> BackendResult<u64> {
        let response = self
            .client
            .get_object()
            .bucket(self.bucket())
            .key(key)
            .send()
            .await
            .map_err(|e| map_get_error(key, e))?;

        let mut reader = response.body.into_async_read();
        let copied = tokio::io::copy(&mut reader, sink).await?;
        sink.flush().await?;
        Ok(copied)
    }

    /// Upload exactly `options.length` bytes from `body`
    ///
    /// The body is buffered before the request is sent; uploads are bounded
    /// by the server's request size limit.
    pub async fn upload_from(
        &self,
        key: &str,
        body: ObjectBody,
        options: PutOptions,
    ) -> BackendResult<u64> {
        let mut data = Vec::with_capacity(options.length.min(8 * 1024 * 1024) as usize);
        body.take(options.length).read_to_end(&mut data).await?;

        let length = data.len() as u64;
        if length != options.length {
            return Err(BackendError::rejected(
                "s3",
                "IncompleteBody",
                format!(
                    "expected {} bytes, body ended after {}",
                    options.length, length
                ),
            )
            .with_status(400));
        }

        let mut request = self
            .client
            .put_object()
            .bucket(self.bucket())
            .key(key)
            .content_length(length as i64)
            .body(ByteStream::from(data));

        if let Some(content_type) = options.content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(map_sdk_error)?;
        Ok(length)
    }
}
