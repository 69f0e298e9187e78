//! meshx block RPC client
//!
//! This crate provides:
//! - [`BlockEnvelope`], the decoded form of one `/block` response
//! - The [`BlockSource`] seam the ingestion pipeline is generic over
//! - [`RpcClient`], the HTTP implementation against a consensus node
//!
//! # Response Format
//!
//! `GET /block` and `GET /block?height=N` return:
//! - `result.block_id.hash`: block hash
//! - `result.block.header.last_block_id.hash`: previous block hash
//! - `result.block.header.height`: height as a decimal string
//! - `result.block.data.txs`: base64 transaction entries (or `null`)

mod client;
mod envelope;
mod error;

pub use client::{BlockSource, RpcClient, RpcConfig};
pub use envelope::BlockEnvelope;
pub use error::{Error, Result};
