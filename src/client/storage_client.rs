use std::time::Duration;

use actix_web::web::Bytes;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use secrecy::Secret;

use url::Url;

/// Object store upload failures
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(#[from] url::ParseError),
    #[error("Failed to upload object: {0}")]
    Upload(#[from] reqwest::Error),
}

/// REST client for the hosted object store holding offer images
#[derive(Debug)]
pub struct StorageClient {
    client: Client,
    bucket: String,

    api_base_url: Url,
    api_auth_token: Secret<String>,
}

impl StorageClient {
    pub fn new(
        api_base_url: Url,
        bucket: String,
        api_timeout: Duration,
        api_auth_token: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(api_timeout).build()?;

        Ok(Self {
            client,
            bucket,
            api_base_url,
            api_auth_token,
        })
    }

    /// Store an object and return the stable public URL it can be read from
    #[tracing::instrument(name = "Upload object to storage", skip(self, bytes), fields(bytes.len = bytes.len()))]
    pub async fn put(&self, key: &str, content_type: &str, bytes: Bytes) -> Result<Url, StorageError> {
        use secrecy::ExposeSecret;

        let upload_url = self
            .api_base_url
            .join(&format!("object/{}/{}", self.bucket, key))?;
        let public_url = self
            .api_base_url
            .join(&format!("object/public/{}/{}", self.bucket, key))?;

        self.client
            .post(upload_url)
            .bearer_auth(self.api_auth_token.expose_secret())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;

        Ok(public_url)
    }
}
