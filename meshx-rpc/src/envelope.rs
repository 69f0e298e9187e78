//! `/block` response decoding

use serde::Deserialize;

use crate::error::{Error, Result};

/// One decoded block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEnvelope {
    pub hash: String,
    pub prev_hash: String,
    pub height: u64,
    /// Raw base64 transaction entries, in block order
    pub transactions: Vec<String>,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<BlockResult>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct BlockResult {
    block_id: BlockId,
    block: Block,
}

#[derive(Deserialize)]
struct BlockId {
    hash: String,
}

#[derive(Deserialize)]
struct Block {
    header: Header,
    #[serde(default)]
    data: Option<BlockData>,
}

#[derive(Deserialize)]
struct Header {
    height: String,
    last_block_id: BlockId,
}

#[derive(Deserialize)]
struct BlockData {
    #[serde(default)]
    txs: Option<Vec<String>>,
}

impl BlockEnvelope {
    /// Parse a `/block` response body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let response: RpcResponse = serde_json::from_slice(body)
            .map_err(|e| Error::Malformed(format!("Invalid block response: {}", e)))?;

        let result = match (response.result, response.error) {
            (Some(result), _) => result,
            (None, Some(error)) => {
                let message = error
                    .get("data")
                    .or_else(|| error.get("message"))
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .unwrap_or_else(|| error.to_string());
                return Err(Error::Malformed(format!("Node returned error: {}", message)));
            }
            (None, None) => return Err(Error::Malformed("Missing result".to_string())),
        };

        let height = result.block.header.height.parse::<u64>().map_err(|e| {
            Error::Malformed(format!(
                "Invalid height {:?}: {}",
                result.block.header.height, e
            ))
        })?;

        let transactions = result.block.data.and_then(|d| d.txs).unwrap_or_default();

        Ok(Self {
            hash: result.block_id.hash,
            prev_hash: result.block.header.last_block_id.hash,
            height,
            transactions,
        })
    }

    /// Check that the node answered for the height that was asked
    pub fn expect_height(self, requested: u64) -> Result<Self> {
        if self.height != requested {
            return Err(Error::Malformed(format!(
                "Requested block {} but node returned {}",
                requested, self.height
            )));
        }
        Ok(self)
    }
}
