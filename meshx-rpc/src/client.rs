//! Block RPC client
//!
//! Fetches blocks from the consensus node's `/block` endpoint. No retries at
//! this layer; callers decide what to do with a failed request.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::envelope::BlockEnvelope;
use crate::error::{Error, Result};

/// RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Node address, `host:port` or a full URL
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:26655".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Anything that can hand out blocks by height
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Current best block
    async fn head(&self) -> Result<BlockEnvelope>;

    /// Block at exactly `height`
    async fn block_at(&self, height: u64) -> Result<BlockEnvelope>;
}

/// HTTP client for a node's block RPC
#[derive(Debug, Clone)]
pub struct RpcClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: normalize_url(&config.url),
            http_client,
        })
    }

    async fn fetch(&self, url: &str) -> Result<BlockEnvelope> {
        tracing::trace!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Unavailable(format!("Request to {} failed: {}", url, e)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Unavailable(format!("Failed to read response: {}", e)))?;

        // A node behind a proxy answers 5xx with an HTML or empty body while it is down
        if status.is_server_error() && serde_json::from_slice::<serde_json::Value>(&body).is_err() {
            return Err(Error::Unavailable(format!("Node returned HTTP {}", status)));
        }

        // JSON-RPC errors still carry a JSON body; let the parser classify them
        BlockEnvelope::from_json(&body)
    }
}

#[async_trait]
impl BlockSource for RpcClient {
    async fn head(&self) -> Result<BlockEnvelope> {
        self.fetch(&format!("{}/block", self.base_url)).await
    }

    async fn block_at(&self, height: u64) -> Result<BlockEnvelope> {
        self.fetch(&format!("{}/block?height={}", self.base_url, height))
            .await?
            .expect_height(height)
    }
}

/// Accept bare `host:port` as well as full URLs
fn normalize_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}
