//! Transaction wire messages
//!
//! A transaction is a protobuf envelope with a `type` discriminator and a
//! oneof payload. The payload set is closed: adding a kind means adding a
//! `TransactionType` variant, a `Payload` variant and its message, and the
//! matches below stop compiling until it is wired through.

use crate::fields::{Field, FieldSet};

/// Declares a payload message together with its `FieldSet` impl.
///
/// Fields are enumerated in the order they are written here, which is also
/// the order rows appear on a rendered page.
macro_rules! payload_message {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident: $ty:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $crate::fields::FieldSet for $name {
            fn fields(&self) -> Vec<$crate::fields::Field> {
                vec![
                    $(
                        $crate::fields::Field::new(
                            stringify!($field),
                            $crate::fields::FieldText::to_field_text(&self.$field),
                        ),
                    )*
                ]
            }
        }
    };
}

/// Transaction discriminator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TransactionType {
    Normal = 0,
    Verification = 1,
    Resource = 2,
    NodeRegistration = 3,
}

impl TransactionType {
    /// Human-readable kind label
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Normal => "Normal",
            TransactionType::Verification => "Verification",
            TransactionType::Resource => "Resource",
            TransactionType::NodeRegistration => "NodeRegistration",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Transaction envelope
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(string, tag = "1")]
    pub owner: String,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
    #[prost(enumeration = "TransactionType", tag = "3")]
    pub tx_type: i32,
    #[prost(oneof = "Payload", tags = "4, 5, 6, 7")]
    pub payload: Option<Payload>,
}

/// The populated payload variant
#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum Payload {
    #[prost(message, tag = "4")]
    Normal(NormalData),
    #[prost(message, tag = "5")]
    Verification(VerificationData),
    #[prost(message, tag = "6")]
    Resource(ResourceData),
    #[prost(message, tag = "7")]
    NodeRegistration(NodeRegistrationData),
}

impl Payload {
    /// Kind this variant belongs to
    pub fn kind(&self) -> TransactionType {
        match self {
            Payload::Normal(_) => TransactionType::Normal,
            Payload::Verification(_) => TransactionType::Verification,
            Payload::Resource(_) => TransactionType::Resource,
            Payload::NodeRegistration(_) => TransactionType::NodeRegistration,
        }
    }

    /// Fields of the populated variant, in declaration order
    pub fn fields(&self) -> Vec<Field> {
        match self {
            Payload::Normal(data) => data.fields(),
            Payload::Verification(data) => data.fields(),
            Payload::Resource(data) => data.fields(),
            Payload::NodeRegistration(data) => data.fields(),
        }
    }
}

payload_message! {
    /// Value transfer between two accounts
    pub struct NormalData {
        #[prost(string, tag = "1")]
        pub from: String,
        #[prost(string, tag = "2")]
        pub to: String,
        #[prost(uint64, tag = "3")]
        pub amount: u64,
        #[prost(string, tag = "4")]
        pub memo: String,
    }
}

payload_message! {
    /// Attestation that a block was checked by a verifier
    pub struct VerificationData {
        #[prost(string, tag = "1")]
        pub block_hash: String,
        #[prost(string, tag = "2")]
        pub verifier: String,
        #[prost(bool, tag = "3")]
        pub verified: bool,
        #[prost(uint64, tag = "4")]
        pub height: u64,
        #[prost(bytes = "vec", tag = "5")]
        pub attestation: Vec<u8>,
    }
}

payload_message! {
    pub struct ResourceUsage {
        #[prost(uint64, tag = "1")]
        pub cpu_millis: u64,
        #[prost(uint64, tag = "2")]
        pub memory_bytes: u64,
        #[prost(uint64, tag = "3")]
        pub bandwidth_bytes: u64,
    }
}

payload_message! {
    /// Work report from a node serving data sources
    pub struct ResourceData {
        #[prost(string, tag = "1")]
        pub node_id: String,
        #[prost(string, repeated, tag = "2")]
        pub sources: Vec<String>,
        #[prost(uint64, tag = "3")]
        pub tasks_completed: u64,
        #[prost(message, optional, tag = "4")]
        pub usage: Option<ResourceUsage>,
    }
}

payload_message! {
    pub struct Endpoint {
        #[prost(string, tag = "1")]
        pub host: String,
        #[prost(uint32, tag = "2")]
        pub port: u32,
    }
}

payload_message! {
    /// A node joining the network
    pub struct NodeRegistrationData {
        #[prost(string, tag = "1")]
        pub node_id: String,
        #[prost(bytes = "vec", tag = "2")]
        pub public_key: Vec<u8>,
        #[prost(message, optional, tag = "3")]
        pub endpoint: Option<Endpoint>,
        #[prost(uint64, tag = "4")]
        pub stake: u64,
    }
}
