use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use zeroize::Zeroizing;

use crate::{errors::AppError, settings::AppConfig};

const BLOB_API_VERSION: &str = "7";

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Whether `url` points at an object this store manages.
    fn owns(&self, url: &str) -> bool;
    async fn delete(&self, url: &str) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct VercelBlobStore {
    client: Client,
    api_url: String,
    public_host: String,
    token: Zeroizing<String>,
}

impl VercelBlobStore {
    pub fn new(config: &AppConfig, client: Client) -> Self {
        VercelBlobStore {
            client,
            api_url: config.blob_api_url.trim_end_matches('/').to_string(),
            public_host: config.blob_public_host.to_lowercase(),
            token: Zeroizing::new(config.blob_read_write_token.clone()),
        }
    }
}

#[async_trait]
impl BlobStore for VercelBlobStore {
    fn owns(&self, url: &str) -> bool {
        url::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
            .is_some_and(|host| host == self.public_host || host.ends_with(&format!(".{}", self.public_host)))
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let response = self.client
            .post(format!("{}/delete", self.api_url))
            .bearer_auth(self.token.as_str())
            .header("x-api-version", BLOB_API_VERSION)
            .json(&json!({ "urls": [url] }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Deleted blob {}", url);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Blob delete for {} failed ({}): {}", url, status, body);
            Err(AppError::InternalError(format!("Blob delete failed with status {}", status)))
        }
    }
}
