//! [`ObjectStore`] over the S3 API.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use folio_core::error::CoreError;
use folio_core::gateway::ObjectStore;

use crate::config::StorageConfig;

/// Gallery bucket client.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_domain: String,
}

impl S3ObjectStore {
    /// Build a client with static credentials from `config`.
    pub async fn connect(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "folio-static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint_url)
            .credentials_provider(credentials)
            .load()
            .await;

        // R2 and most self-hosted S3 servers expect path-style addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        tracing::info!(
            endpoint = %config.endpoint_url,
            bucket = %config.bucket,
            "Object store client configured"
        );

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_domain: config.public_domain.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), CoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| {
                let detail = DisplayErrorContext(&err).to_string();
                tracing::error!(key, error = %detail, "S3 put_object failed");
                CoreError::Upstream(format!("Object upload failed: {detail}"))
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let detail = DisplayErrorContext(&err).to_string();
                tracing::error!(key, error = %detail, "S3 delete_object failed");
                CoreError::Upstream(format!("Object delete failed: {detail}"))
            })?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.public_domain, key)
    }
}

fn public_url(domain: &str, key: &str) -> String {
    format!("{domain}/{}", key.trim_start_matches('/'))
}
