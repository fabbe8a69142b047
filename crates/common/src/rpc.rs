//! Soroban RPC utilities.
//!
//! This module provides a thin JSON-RPC 2.0 client for Soroban RPC nodes.
//! Transaction envelopes, simulation footprints and return values are passed around as
//! base64-encoded XDR strings: building and decoding XDR is the job of the contract bindings,
//! while this client is only concerned with transport.
//!
//! # Transaction lifecycle
//!
//! A write call is first simulated with [`RpcClient::simulate_transaction`], then the signed
//! envelope is submitted with [`RpcClient::send_transaction`]. The returned transaction hash
//! can be polled with [`RpcClient::get_transaction`] until a terminal status is reached.

use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::{Display, Error, From};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

/// Soroban RPC client errors.
#[derive(Debug, Display, From, Error)]
pub enum RpcError {
    /// HTTP client error.
    Http(reqwest::Error),

    /// JSON-RPC error object returned by the node.
    #[display(fmt = "rpc error {}: {}", code, message)]
    Rpc {
        /// JSON-RPC error code.
        code: i64,

        /// Error message.
        message: String,
    },

    /// Response contained neither a result nor an error.
    #[display(fmt = "rpc response is missing a result")]
    MissingResult,
}

/// JSON-RPC request body.
#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

/// JSON-RPC response body.
#[derive(Deserialize)]
struct Response<R> {
    result: Option<R>,
    error: Option<ResponseError>,
}

/// JSON-RPC error object.
#[derive(Deserialize)]
struct ResponseError {
    code: i64,
    message: String,
}

/// `getHealth` method response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// Node health status, `healthy` when the node is in sync.
    pub status: String,

    /// Latest ledger known to the node.
    #[serde(default)]
    pub latest_ledger: Option<u32>,

    /// Oldest ledger retained by the node.
    #[serde(default)]
    pub oldest_ledger: Option<u32>,
}

impl Health {
    /// Check if the node reports itself as healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// `getNetwork` method response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// Network passphrase.
    pub passphrase: String,

    /// Current protocol version.
    pub protocol_version: u32,

    /// Friendbot URL, present on test networks.
    #[serde(default)]
    pub friendbot_url: Option<String>,
}

/// `getLatestLedger` method response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LatestLedger {
    /// Ledger hash.
    pub id: String,

    /// Protocol version of the ledger.
    pub protocol_version: u32,

    /// Ledger sequence number.
    pub sequence: u32,
}

/// A single host function invocation result from a simulation.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SimulationResult {
    /// Authorization entries required by the invocation.
    #[serde(default)]
    pub auth: Vec<String>,

    /// Return value of the invocation.
    pub xdr: String,
}

/// `simulateTransaction` method response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    /// Ledger the simulation was performed at.
    pub latest_ledger: u32,

    /// Minimal resource fee, in stroops, as a decimal string.
    #[serde(default)]
    pub min_resource_fee: Option<String>,

    /// Soroban transaction data with the footprint.
    #[serde(default)]
    pub transaction_data: Option<String>,

    /// Invocation results.
    #[serde(default)]
    pub results: Vec<SimulationResult>,

    /// Host error description if the simulation failed.
    #[serde(default)]
    pub error: Option<String>,
}

/// `sendTransaction` method response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SentTransaction {
    /// Transaction hash, hex-encoded.
    pub hash: String,

    /// Submission status: `PENDING`, `DUPLICATE`, `TRY_AGAIN_LATER` or `ERROR`.
    pub status: String,

    /// Ledger known to the node at submission time.
    pub latest_ledger: u32,

    /// Transaction result if the submission was rejected.
    #[serde(default)]
    pub error_result_xdr: Option<String>,
}

/// `getTransaction` method response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    /// Transaction status: `SUCCESS`, `FAILED` or `NOT_FOUND`.
    pub status: String,

    /// Ledger known to the node.
    pub latest_ledger: u32,

    /// Ledger the transaction was included in.
    #[serde(default)]
    pub ledger: Option<u32>,

    /// Transaction result.
    #[serde(default)]
    pub result_xdr: Option<String>,

    /// Transaction result metadata, which contains the contract return value.
    #[serde(default)]
    pub result_meta_xdr: Option<String>,

    /// Contract return value, reported by newer RPC versions.
    #[serde(default)]
    pub return_value: Option<String>,
}

/// Soroban JSON-RPC client.
#[derive(Debug)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create new client for the provided RPC endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// RPC endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check the node health.
    pub async fn health(&self) -> Result<Health, RpcError> {
        self.request("getHealth", json!({})).await
    }

    /// Get the network information, including its passphrase.
    pub async fn network(&self) -> Result<NetworkInfo, RpcError> {
        self.request("getNetwork", json!({})).await
    }

    /// Get the latest ledger known to the node.
    pub async fn latest_ledger(&self) -> Result<LatestLedger, RpcError> {
        self.request("getLatestLedger", json!({})).await
    }

    /// Simulate an unsigned transaction envelope.
    pub async fn simulate_transaction(&self, envelope_xdr: &str) -> Result<Simulation, RpcError> {
        self.request("simulateTransaction", json!({ "transaction": envelope_xdr }))
            .await
    }

    /// Submit a signed transaction envelope.
    ///
    /// Submission only means the node accepted the transaction into its queue,
    /// use [`RpcClient::get_transaction`] to await the inclusion.
    pub async fn send_transaction(&self, envelope_xdr: &str) -> Result<SentTransaction, RpcError> {
        self.request("sendTransaction", json!({ "transaction": envelope_xdr }))
            .await
    }

    /// Get the status of a previously submitted transaction.
    pub async fn get_transaction(&self, hash: &str) -> Result<TransactionInfo, RpcError> {
        self.request("getTransaction", json!({ "hash": hash })).await
    }

    #[instrument(skip(self, params), fields(url = %self.url))]
    async fn request<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        debug!(id, "sending rpc request");

        let response: Response<R> = self
            .client
            .post(&self.url)
            .json(&Request {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_response(response)
    }
}

fn decode_response<R>(response: Response<R>) -> Result<R, RpcError> {
    match response {
        Response {
            error: Some(ResponseError { code, message }),
            ..
        } => Err(RpcError::Rpc { code, message }),
        Response {
            result: Some(result),
            ..
        } => Ok(result),
        _ => Err(RpcError::MissingResult),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode<R: DeserializeOwned>(value: serde_json::Value) -> Result<R, RpcError> {
        decode_response(serde_json::from_value::<Response<R>>(value).expect("invalid response"))
    }

    #[test]
    fn transaction_info() {
        let info: TransactionInfo = decode(json!({
            "jsonrpc": "2.0",
            "id": 8675309,
            "result": {
                "status": "SUCCESS",
                "latestLedger": 2540076,
                "latestLedgerCloseTime": "1700086333",
                "oldestLedger": 2538637,
                "ledger": 2540064,
                "createdAt": "1700086268",
                "applicationOrder": 1,
                "envelopeXdr": "AAAAAgAAAAA=",
                "resultXdr": "AAAAAAAAAGQAAAAAAAAAAQAAAAAAAAAYAAAAAA==",
                "resultMetaXdr": "AAAAAwAAAAA="
            }
        }))
        .unwrap();

        assert_eq!(info.status, "SUCCESS");
        assert_eq!(info.ledger, Some(2540064));
        assert_eq!(info.result_meta_xdr.as_deref(), Some("AAAAAwAAAAA="));
        assert_eq!(info.return_value, None);
    }

    #[test]
    fn missing_transaction() {
        let info: TransactionInfo = decode(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "status": "NOT_FOUND",
                "latestLedger": 2540076,
                "oldestLedger": 2538637
            }
        }))
        .unwrap();

        assert_eq!(info.status, "NOT_FOUND");
        assert_eq!(info.ledger, None);
    }

    #[test]
    fn sent_transaction() {
        let sent: SentTransaction = decode(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": {
                "status": "PENDING",
                "hash": "d8ec9b68780314ffdfdfc2194b1b35dd27d7303c3bceaef6447e31631a1419dc",
                "latestLedger": 2553978,
                "latestLedgerCloseTime": "1700159337"
            }
        }))
        .unwrap();

        assert_eq!(sent.status, "PENDING");
        assert_eq!(sent.error_result_xdr, None);
    }

    #[test]
    fn failed_simulation() {
        let simulation: Simulation = decode(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "result": {
                "latestLedger": 100,
                "error": "HostError: Error(Contract, #2)"
            }
        }))
        .unwrap();

        assert!(simulation.results.is_empty());
        assert_eq!(
            simulation.error.as_deref(),
            Some("HostError: Error(Contract, #2)")
        );
    }

    #[test]
    fn rpc_error() {
        let result = decode::<Health>(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "error": {
                "code": -32602,
                "message": "invalid parameters"
            }
        }));

        assert!(matches!(
            result,
            Err(RpcError::Rpc { code: -32602, message }) if message == "invalid parameters"
        ));
    }

    #[test]
    fn empty_response() {
        assert!(matches!(
            decode::<Health>(json!({ "jsonrpc": "2.0", "id": 5 })),
            Err(RpcError::MissingResult)
        ));
    }

    #[test]
    fn network_info() {
        let network: NetworkInfo = decode(json!({
            "jsonrpc": "2.0",
            "id": 6,
            "result": {
                "friendbotUrl": "https://friendbot.stellar.org/",
                "passphrase": "Test SDF Network ; September 2015",
                "protocolVersion": 22
            }
        }))
        .unwrap();

        assert_eq!(network.passphrase, "Test SDF Network ; September 2015");
        assert_eq!(network.protocol_version, 22);
    }
}
