//! Raw transaction decoding
//!
//! `data.txs` entries are base64 strings holding one protobuf `Transaction`
//! each. Decoding is a pure function of the entry.

use base64::prelude::*;
use prost::Message;

use crate::error::{Result, TxError};
use crate::fields::Field;
use crate::transaction::{Transaction, TransactionType};

/// Display form of one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub kind: TransactionType,
    pub fields: Vec<Field>,
}

impl DecodedTransaction {
    pub fn kind_label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Decode one raw `data.txs` entry
pub fn decode_transaction(raw: &str) -> Result<DecodedTransaction> {
    let bytes = BASE64_STANDARD.decode(raw.trim())?;
    let tx = Transaction::decode(bytes.as_slice())?;

    let payload = tx.payload.as_ref().ok_or_else(|| {
        TxError::UnknownKind(format!("no payload populated (type {})", tx.tx_type))
    })?;

    let kind = TransactionType::try_from(tx.tx_type)
        .map_err(|_| TxError::UnknownKind(format!("unrecognized type {}", tx.tx_type)))?;

    if payload.kind() != kind {
        return Err(TxError::Decode(format!(
            "type {} carries a {} payload",
            kind,
            payload.kind()
        )));
    }

    Ok(DecodedTransaction {
        kind,
        fields: payload.fields(),
    })
}
