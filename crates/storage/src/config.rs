//! Object storage configuration loaded from environment variables.

/// Errors raised while reading storage configuration.
#[derive(Debug, thiserror::Error)]
pub enum StorageConfigError {
    /// One or more required variables are unset or empty.
    #[error("Missing storage environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Connection settings for an S3-compatible bucket (Cloudflare R2 by default).
#[derive(Clone)]
pub struct StorageConfig {
    /// S3 API endpoint.
    pub endpoint_url: String,
    /// Signing region; R2 accepts `auto`.
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    /// Public base URL objects are served from, without a trailing slash.
    pub public_domain: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("public_domain", &self.public_domain)
            .finish()
    }
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Notes                                              |
    /// |------------------------|----------------------------------------------------|
    /// | `S3_ENDPOINT_URL`      | explicit endpoint; takes precedence over account id |
    /// | `R2_ACCOUNT_ID`        | builds `https://<id>.r2.cloudflarestorage.com`      |
    /// | `R2_ACCESS_KEY_ID`     | required                                           |
    /// | `R2_SECRET_ACCESS_KEY` | required                                           |
    /// | `R2_BUCKET_NAME`       | required                                           |
    /// | `PUBLIC_ASSET_DOMAIN`  | required, e.g. `https://assets.example.com`        |
    /// | `S3_REGION`            | default `auto`                                     |
    ///
    /// Every missing variable is reported at once.
    pub fn from_env() -> Result<Self, StorageConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StorageConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut missing = Vec::new();

        let endpoint_url = get("S3_ENDPOINT_URL").or_else(|| {
            get("R2_ACCOUNT_ID").map(|id| format!("https://{id}.r2.cloudflarestorage.com"))
        });
        if endpoint_url.is_none() {
            missing.push("R2_ACCOUNT_ID");
        }

        let mut required = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key);
            }
            value
        };
        let access_key_id = required("R2_ACCESS_KEY_ID");
        let secret_access_key = required("R2_SECRET_ACCESS_KEY");
        let bucket = required("R2_BUCKET_NAME");
        let public_domain = required("PUBLIC_ASSET_DOMAIN");

        match (
            endpoint_url,
            access_key_id,
            secret_access_key,
            bucket,
            public_domain,
        ) {
            (
                Some(endpoint_url),
                Some(access_key_id),
                Some(secret_access_key),
                Some(bucket),
                Some(public_domain),
            ) => Ok(Self {
                endpoint_url,
                region: get("S3_REGION").unwrap_or_else(|| "auto".into()),
                access_key_id,
                secret_access_key,
                bucket,
                public_domain: public_domain.trim_end_matches('/').to_string(),
            }),
            _ => Err(StorageConfigError::Missing(missing)),
        }
    }
}
