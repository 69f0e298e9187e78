//! Error types for transaction decoding

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TxError {
    /// Raw entry is not valid base64
    #[error("Encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Payload bytes are not a well-formed transaction envelope
    #[error("Decode error: {0}")]
    Decode(String),

    /// No recognized payload variant is populated
    #[error("Unknown transaction kind: {0}")]
    UnknownKind(String),
}

impl From<prost::DecodeError> for TxError {
    fn from(e: prost::DecodeError) -> Self {
        TxError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TxError>;
