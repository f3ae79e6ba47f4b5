//! Client for the external asset-storage service
//!
//! Mirrors the contract the rest of the system relies on: `store` and
//! `remove` never fail loudly. A `None`/`false` result is the only failure
//! signal, and the locally staged file is gone after `store` returns,
//! whether the upload worked or not.

use serde::Deserialize;
use std::path::Path;
use tracing::{error, warn};

/// Asset-store configuration
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Base URL of the asset service
    pub base_url: String,
}

impl AssetConfig {
    /// Create a new AssetConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ASSET_STORE_URL`: base URL of the asset service (default: `http://localhost:9000`)
    pub fn from_env() -> Self {
        let base_url = std::env::var("ASSET_STORE_URL")
            .unwrap_or_else(|_| "http://localhost:9000".to_string());
        AssetConfig { base_url }
    }
}

/// A stored asset as reported by the service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAsset {
    pub url: String,
    pub duration_seconds: Option<f64>,
}

/// Injected client for the asset service
#[derive(Debug, Clone)]
pub struct AssetClient {
    http: reqwest::Client,
    base_url: String,
}

impl AssetClient {
    pub fn new(config: &AssetConfig) -> Self {
        AssetClient {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upload a staged local file; `None` on any failure.
    ///
    /// The staged file is removed on both the success and the failure path.
    pub async fn store(&self, local_path: &str) -> Option<StoredAsset> {
        let bytes = match tokio::fs::read(local_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to read staged file {}: {}", local_path, e);
                return None;
            }
        };

        let file_name = Path::new(local_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("asset")
            .to_string();

        let result = self
            .http
            .post(format!("{}/assets", self.base_url))
            .query(&[("name", file_name.as_str())])
            .body(bytes)
            .send()
            .await;

        self.discard_staged(local_path).await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<StoredAsset>().await {
                    Ok(asset) => Some(asset),
                    Err(e) => {
                        error!("Asset store returned an unreadable response: {}", e);
                        None
                    }
                }
            }
            Ok(response) => {
                error!("Asset store rejected upload: {}", response.status());
                None
            }
            Err(e) => {
                error!("Asset store unreachable: {}", e);
                None
            }
        }
    }

    /// Best-effort delete of a stored asset by its URL
    pub async fn remove(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }

        let result = self
            .http
            .delete(format!("{}/assets", self.base_url))
            .query(&[("url", url)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Asset store refused delete of {}: {}", url, response.status());
                false
            }
            Err(e) => {
                warn!("Asset store unreachable while deleting {}: {}", url, e);
                false
            }
        }
    }

    async fn discard_staged(&self, local_path: &str) {
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            warn!("Failed to remove staged file {}: {}", local_path, e);
        }
    }
}
