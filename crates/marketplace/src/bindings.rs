//! Contract binding seam.
//!
//! Building contract calls into XDR transactions is the job of the generated contract
//! bindings. This module only describes calls in a binding-neutral way and defines the
//! [`ContractInvoker`] trait the rest of the crate talks to.

use async_trait::async_trait;
use derive_more::Display;
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;

use crate::{errors::parse_host_error_code, model::WasmHash, network::TransactionStatus};

/// Unsigned or signed transaction envelope, base64-encoded XDR.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub struct Envelope(pub String);

impl Envelope {
    /// Envelope XDR value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contract call argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arg {
    U32(u32),
    U64(u64),
    Bool(bool),
    String(String),
    Symbol(String),

    /// Account or contract address.
    Address(String),

    /// `BytesN<32>` value.
    Bytes32([u8; 32]),
    Vec(Vec<Arg>),
    Option(Option<Box<Arg>>),

    /// Contract type with named fields.
    Struct(Vec<(String, Arg)>),
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Arg::U32(value) => serializer.serialize_u32(*value),
            Arg::U64(value) => serializer.serialize_u64(*value),
            Arg::Bool(value) => serializer.serialize_bool(*value),
            Arg::String(value) | Arg::Symbol(value) | Arg::Address(value) => {
                serializer.serialize_str(value)
            }
            Arg::Bytes32(value) => serializer.serialize_str(&hex::encode(value)),
            Arg::Vec(values) => values.serialize(serializer),
            Arg::Option(value) => value.serialize(serializer),
            Arg::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<WasmHash> for Arg {
    fn from(value: WasmHash) -> Self {
        Arg::Bytes32(value.0)
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Arg::U32(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<Vec<String>> for Arg {
    fn from(value: Vec<String>) -> Self {
        Arg::Vec(value.into_iter().map(Arg::String).collect())
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        Arg::Option(value.map(|value| Box::new(value.into())))
    }
}

/// Contract method invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    /// Contract address.
    pub contract: String,

    /// Contract method name.
    pub method: &'static str,

    /// Positional method arguments.
    pub args: Vec<Arg>,
}

impl ContractCall {
    /// Create a call without arguments.
    pub fn new(contract: impl Into<String>, method: &'static str) -> Self {
        Self {
            contract: contract.into(),
            method,
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Contract binding errors.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum InvokeError {
    /// Contract returned an error code during simulation.
    #[display(fmt = "contract error #{}", _0)]
    Contract(u32),

    /// Simulation failed for a reason other than a contract error.
    #[display(fmt = "simulation failed: {}", _0)]
    Simulation(String),

    /// Binding was unable to reach the network.
    #[display(fmt = "transport error: {}", _0)]
    Transport(String),

    /// Binding was unable to decode a value.
    #[display(fmt = "unable to decode value: {}", _0)]
    Decode(String),
}

impl std::error::Error for InvokeError {}

impl InvokeError {
    /// Contract error code, if the failure was caused by one.
    pub fn contract_code(&self) -> Option<u32> {
        match self {
            InvokeError::Contract(code) => Some(*code),
            InvokeError::Simulation(message) => parse_host_error_code(message),
            _ => None,
        }
    }
}

/// Generated contract bindings.
///
/// Values are exchanged as JSON in the shape the bindings render them, and are decoded
/// with [`crate::outcome::decode_outcome`].
#[async_trait]
pub trait ContractInvoker: Send + Sync {
    /// Simulate a call and return its result. Used for read-only calls.
    async fn simulate(&self, call: &ContractCall) -> Result<Value, InvokeError>;

    /// Simulate a write call and assemble an unsigned transaction with the provided source account.
    async fn assemble(&self, call: &ContractCall, source: &str) -> Result<Envelope, InvokeError>;

    /// Assemble an unsigned WASM upload transaction.
    async fn assemble_upload(&self, wasm: &[u8], source: &str) -> Result<Envelope, InvokeError>;

    /// Check if a WASM blob with the provided hash is already installed on the network.
    async fn is_installed(&self, hash: &WasmHash) -> Result<bool, InvokeError>;

    /// Decode the return value of a confirmed transaction.
    fn decode_return_value(&self, status: &TransactionStatus)
        -> Result<Option<Value>, InvokeError>;
}
