//! Daemon configuration

use meshx_rpc::RpcConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output directory for rendered pages
    pub dir: PathBuf,
    pub poll_interval_ms: u64,
    pub queue_capacity: usize,
    /// Highest height considered already rendered when no checkpoint exists
    pub start_height: u64,
    /// HTML template file; the built-in layout when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub listen: SocketAddr,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("renders"),
            poll_interval_ms: 400,
            queue_capacity: 256,
            start_height: 0,
            template: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 250,
            max_delay_ms: 10_000,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: SocketAddr::from(([127, 0, 0, 1], 9999)),
        }
    }
}

impl RenderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load config from file, or use defaults if it doesn't exist
    pub fn load(path: &Path) -> crate::Result<Self> {
        let config: Self = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| crate::DaemonError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::DaemonError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.render.poll_interval_ms == 0 {
            return Err(crate::DaemonError::Config("render.poll_interval_ms must be > 0".to_string()));
        }
        if self.render.queue_capacity == 0 {
            return Err(crate::DaemonError::Config("render.queue_capacity must be > 0".to_string()));
        }
        if self.retry.initial_delay_ms == 0 || self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(crate::DaemonError::Config(
                "retry delays must satisfy 0 < initial_delay_ms <= max_delay_ms".to_string(),
            ));
        }
        if self.rpc.url.trim().is_empty() {
            return Err(crate::DaemonError::Config("rpc.url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Get the base meshx directory
    pub fn meshx_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".meshx"))
            .unwrap_or_else(|| PathBuf::from(".meshx"))
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::meshx_dir().join("config.toml")
    }
}
