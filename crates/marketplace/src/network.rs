//! Transaction submission and status lookup.

use std::str::FromStr;

use async_trait::async_trait;
use common::rpc::{RpcClient, RpcError, SentTransaction, TransactionInfo};
use derive_more::{Display, Error, From};

use crate::bindings::Envelope;

/// Network errors.
#[derive(Debug, Display, From, Error)]
pub enum NetworkError {
    /// Soroban RPC error.
    Rpc(RpcError),

    /// Node returned a status this client does not understand.
    #[display(fmt = "unknown transaction status: {}", _0)]
    UnknownStatus(#[error(ignore)] String),
}

/// Status of a transaction submission.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum SendStatus {
    /// Transaction was accepted into the queue.
    #[display(fmt = "PENDING")]
    Pending,

    /// Transaction was already submitted.
    #[display(fmt = "DUPLICATE")]
    Duplicate,

    /// Node is overloaded, the transaction may be submitted again later.
    #[display(fmt = "TRY_AGAIN_LATER")]
    TryAgainLater,

    /// Transaction was rejected.
    #[display(fmt = "ERROR")]
    Error,
}

impl FromStr for SendStatus {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "PENDING" => SendStatus::Pending,
            "DUPLICATE" => SendStatus::Duplicate,
            "TRY_AGAIN_LATER" => SendStatus::TryAgainLater,
            "ERROR" => SendStatus::Error,
            _ => return Err(NetworkError::UnknownStatus(s.to_owned())),
        })
    }
}

impl SendStatus {
    /// Check if the transaction is expected to reach the ledger.
    pub fn is_accepted(self) -> bool {
        matches!(self, SendStatus::Pending | SendStatus::Duplicate)
    }
}

/// Result of a transaction submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// Transaction hash, hex-encoded.
    pub hash: String,
    pub status: SendStatus,

    /// Transaction result, present for rejected submissions.
    pub error_result_xdr: Option<String>,
}

/// Transaction status.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum TxStatus {
    #[display(fmt = "SUCCESS")]
    Success,

    #[display(fmt = "FAILED")]
    Failed,

    /// Transaction is not yet included into a ledger, or is not known to the node.
    #[display(fmt = "NOT_FOUND")]
    NotFound,
}

impl TxStatus {
    /// Check if the status can no longer change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TxStatus::NotFound)
    }
}

impl FromStr for TxStatus {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SUCCESS" => TxStatus::Success,
            "FAILED" => TxStatus::Failed,
            "NOT_FOUND" => TxStatus::NotFound,
            _ => return Err(NetworkError::UnknownStatus(s.to_owned())),
        })
    }
}

/// Transaction lookup result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionStatus {
    pub status: TxStatus,

    /// Ledger the transaction was included in.
    pub ledger: Option<u32>,
    pub result_xdr: Option<String>,
    pub result_meta_xdr: Option<String>,

    /// Contract return value XDR.
    pub return_value_xdr: Option<String>,
}

impl TransactionStatus {
    /// Status of a transaction the node does not know about yet.
    pub fn not_found() -> Self {
        Self {
            status: TxStatus::NotFound,
            ledger: None,
            result_xdr: None,
            result_meta_xdr: None,
            return_value_xdr: None,
        }
    }
}

impl TryFrom<SentTransaction> for Submission {
    type Error = NetworkError;

    fn try_from(sent: SentTransaction) -> Result<Self, Self::Error> {
        Ok(Self {
            status: sent.status.parse()?,
            hash: sent.hash,
            error_result_xdr: sent.error_result_xdr,
        })
    }
}

impl TryFrom<TransactionInfo> for TransactionStatus {
    type Error = NetworkError;

    fn try_from(info: TransactionInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            status: info.status.parse()?,
            ledger: info.ledger,
            result_xdr: info.result_xdr,
            result_meta_xdr: info.result_meta_xdr,
            return_value_xdr: info.return_value,
        })
    }
}

/// Stellar network access.
#[async_trait]
pub trait Network: Send + Sync {
    /// Submit a signed transaction envelope.
    async fn send_transaction(&self, envelope: &Envelope) -> Result<Submission, NetworkError>;

    /// Get the current status of a submitted transaction.
    async fn get_transaction(&self, hash: &str) -> Result<TransactionStatus, NetworkError>;
}

#[async_trait]
impl Network for RpcClient {
    async fn send_transaction(&self, envelope: &Envelope) -> Result<Submission, NetworkError> {
        RpcClient::send_transaction(self, envelope.as_str())
            .await?
            .try_into()
    }

    async fn get_transaction(&self, hash: &str) -> Result<TransactionStatus, NetworkError> {
        RpcClient::get_transaction(self, hash).await?.try_into()
    }
}
