#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! S3-compatible object storage for mirrored gazette documents.
//!
//! [`S3Sink`] implements [`ArtifactSink`] on top of `aws-sdk-s3`. Bucket and
//! region are fixed for the whole run. Credentials come from the standard
//! AWS provider chain, optionally pinned to a named profile.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `CGR_MIRROR_ENDPOINT_URL` | No | S3-compatible endpoint (R2, `MinIO`), used when no endpoint is configured explicitly |
//! | `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` | No | Read by the AWS SDK when no profile supplies credentials |

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::StalledStreamProtectionConfig;
use cgr_mirror_gazette::artifact::{ArtifactSink, ObjectMetadata, StoreError};

/// Bucket the knowledge base reads gazette documents from.
pub const DEFAULT_BUCKET: &str = "knowledge-base-thelexai-laws-datasource-cri";

/// Region of [`DEFAULT_BUCKET`].
pub const DEFAULT_REGION: &str = "us-east-2";

/// AWS profile holding credentials for [`DEFAULT_BUCKET`].
pub const DEFAULT_PROFILE: &str = "thelexai-profile-us-east-2";

/// Environment variable consulted for a custom endpoint.
pub const ENDPOINT_ENV: &str = "CGR_MIRROR_ENDPOINT_URL";

/// Errors that can occur while setting up storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required setting is empty.
    #[error("Missing storage setting: {name}")]
    MissingSetting {
        /// Name of the missing setting.
        name: String,
    },
}

/// Run-wide storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Destination bucket.
    pub bucket: String,
    /// Bucket region.
    pub region: String,
    /// Named AWS profile to load credentials from.
    pub profile: Option<String>,
    /// Custom S3-compatible endpoint. Switches to path-style addressing.
    pub endpoint_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_owned(),
            region: DEFAULT_REGION.to_owned(),
            profile: Some(DEFAULT_PROFILE.to_owned()),
            endpoint_url: None,
        }
    }
}

impl StorageConfig {
    /// Fills in [`Self::endpoint_url`] from [`ENDPOINT_ENV`] when it is not
    /// already set.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(optional_env)
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.endpoint_url.is_none() {
            self.endpoint_url = lookup(ENDPOINT_ENV);
        }
        self
    }

    /// Checks that bucket and region are present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingSetting`] naming the first empty
    /// setting.
    pub fn validate(&self) -> Result<(), StorageError> {
        for (name, value) in [("bucket", &self.bucket), ("region", &self.region)] {
            if value.trim().is_empty() {
                return Err(StorageError::MissingSetting {
                    name: name.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Writes mirrored documents to an S3 bucket.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Sink {
    /// Loads AWS configuration and creates the client.
    ///
    /// No request is made until the first write, so bad credentials
    /// surface as per-document storage failures.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingSetting`] if `config` fails
    /// validation.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        config.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled());
        if let Some(endpoint) = &config.endpoint_url {
            log::info!("Using S3 endpoint {endpoint}");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::from_client(
            aws_sdk_s3::Client::from_conf(builder.build()),
            &config.bucket,
        ))
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn from_client(client: aws_sdk_s3::Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_owned(),
        }
    }

    /// Destination bucket.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ArtifactSink for S3Sink {
    fn location(&self, key: &str) -> String {
        format!("s3://{}/{key}", self.bucket)
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(body))
            .content_type(content_type);

        for (name, value) in metadata {
            request = request.metadata(name, value);
        }

        request.send().await.map_err(|e| StoreError {
            key: key.to_owned(),
            source: aws_sdk_s3::error::DisplayErrorContext(e).to_string().into(),
        })?;

        log::debug!("Uploaded {}", self.location(key));
        Ok(())
    }
}

/// Reads an environment variable, treating empty values as unset.
fn optional_env(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::config::{Credentials, RequestChecksumCalculation, retry::RetryConfig};
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn sink_for(server: &MockServer, bucket: &str) -> S3Sink {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(DEFAULT_REGION))
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
            .endpoint_url(server.uri())
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .build();
        S3Sink::from_client(aws_sdk_s3::Client::from_conf(config), bucket)
    }

    fn offline_client() -> aws_sdk_s3::Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(DEFAULT_REGION))
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }

    #[test]
    fn default_config_targets_the_knowledge_base_bucket() {
        let config = StorageConfig::default();
        assert_eq!(config.bucket, DEFAULT_BUCKET);
        assert_eq!(config.region, "us-east-2");
        assert_eq!(config.profile.as_deref(), Some(DEFAULT_PROFILE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_bucket_fails_validation() {
        let config = StorageConfig {
            bucket: "  ".to_owned(),
            ..StorageConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing storage setting: bucket");
    }

    #[test]
    fn empty_region_fails_validation() {
        let config = StorageConfig {
            region: String::new(),
            ..StorageConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(StorageError::MissingSetting { name }) if name == "region"
        ));
    }

    #[test]
    fn explicit_endpoint_wins_over_env() {
        let config = StorageConfig {
            endpoint_url: Some("http://localhost:9000".to_owned()),
            ..StorageConfig::default()
        }
        .with_env_overrides();

        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn location_is_an_s3_uri() {
        let sink = S3Sink::from_client(offline_client(), "docs");
        assert_eq!(sink.bucket(), "docs");
        assert_eq!(
            sink.location("publico/docs_cgr/2025/a.pdf"),
            "s3://docs/publico/docs_cgr/2025/a.pdf"
        );
    }

    #[tokio::test]
    async fn connect_rejects_invalid_config_before_loading_credentials() {
        let config = StorageConfig {
            bucket: String::new(),
            ..StorageConfig::default()
        };

        assert!(S3Sink::connect(&config).await.is_err());
    }

    #[test]
    fn env_endpoint_fills_a_missing_endpoint() {
        let config = StorageConfig::default().with_overrides_from(|name| {
            (name == ENDPOINT_ENV).then(|| "http://localhost:9000".to_owned())
        });

        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn explicit_endpoint_is_not_replaced_by_env() {
        let config = StorageConfig {
            endpoint_url: Some("http://explicit:9000".to_owned()),
            ..StorageConfig::default()
        }
        .with_overrides_from(|_| Some("http://env:9000".to_owned()));

        assert_eq!(config.endpoint_url.as_deref(), Some("http://explicit:9000"));
    }

    #[test]
    fn blank_env_values_count_as_unset() {
        assert_eq!(non_blank(Some("   ".to_owned())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(
            non_blank(Some("http://localhost:9000".to_owned())).as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[tokio::test]
    async fn put_object_writes_pdf_with_metadata_under_path_style_key() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/docs/publico/docs_cgr/2025/a.pdf"))
            .and(header("content-type", "application/pdf"))
            .and(header("x-amz-meta-row", "7"))
            .and(header("x-amz-meta-fecha-emision", "05/03/2025"))
            .and(body_bytes(b"%PDF-1.7".to_vec()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink_for(&server, "docs");
        let metadata = ObjectMetadata::from([
            ("row".to_owned(), "7".to_owned()),
            ("fecha-emision".to_owned(), "05/03/2025".to_owned()),
        ]);

        sink.put_object(
            "publico/docs_cgr/2025/a.pdf",
            b"%PDF-1.7".to_vec(),
            "application/pdf",
            &metadata,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn server_error_becomes_store_error_with_key() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = sink_for(&server, "docs");
        let err = sink
            .put_object(
                "publico/a.pdf",
                b"%PDF".to_vec(),
                "application/pdf",
                &ObjectMetadata::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.key, "publico/a.pdf");
    }
}
