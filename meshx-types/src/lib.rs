//! meshx transaction types
//!
//! This crate provides:
//! - The protobuf transaction messages carried in block `data.txs`
//! - The closed set of transaction kinds and their payload union
//! - Generic flattening of any payload into ordered `(name, text)` fields
//! - Decoding of a raw base64 entry into a [`DecodedTransaction`]

pub mod error;
pub mod fields;
pub mod transaction;

mod decode;

pub use decode::{decode_transaction, DecodedTransaction};
pub use error::{Result, TxError};
pub use fields::{Field, FieldSet, FieldText};
pub use transaction::{
    Endpoint, NodeRegistrationData, NormalData, Payload, ResourceData, ResourceUsage, Transaction,
    TransactionType, VerificationData,
};
