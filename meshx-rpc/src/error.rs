//! Error types for the RPC crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or timeout reaching the node
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// Response is missing required fields or contradicts the request
    #[error("Malformed response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
