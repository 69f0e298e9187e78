//! meshx Daemon
//!
//! Follows a consensus node's chain head, fetches every block once in height
//! order, decodes its transactions and renders linked HTML pages into a
//! directory served by the built-in page server.

pub mod config;
pub mod http;
pub mod render;
pub mod retry;
pub mod scheduler;
pub mod store;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] meshx_rpc::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Work queue closed")]
    QueueClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DaemonError {
    /// Errors worth retrying the same block for
    pub fn is_retryable(&self) -> bool {
        matches!(self, DaemonError::Rpc(_) | DaemonError::Filesystem(_))
    }
}

pub type Result<T> = std::result::Result<T, DaemonError>;
