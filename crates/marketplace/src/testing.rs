//! Test doubles of the binding, network and wallet seams.
//!
//! Envelopes produced by [`MockInvoker`] carry the name of the called method. The envelope
//! doubles as the transaction hash in [`MockNetwork`], and is copied into the return value
//! of confirmed transactions, so that [`MockInvoker`] can resolve scripted return values.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use common::config::Config;
use serde_json::{json, Value};

use crate::{
    bindings::{ContractCall, ContractInvoker, Envelope, InvokeError},
    context::Marketplace,
    model::WasmHash,
    network::{Network, NetworkError, SendStatus, Submission, TransactionStatus, TxStatus},
    transaction::TransactionPipeline,
    wallet::{SignError, Wallet},
};

pub(crate) const ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
pub(crate) const PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Smallest valid WebAssembly module: magic number and version.
pub(crate) const EMPTY_MODULE: &[u8] = b"\0asm\x01\0\0\0";

const UPLOAD_METHOD: &str = "upload_wasm";
const SIGNED_PREFIX: &str = "signed:";

type Simulation = Box<dyn Fn(&ContractCall) -> Result<Value, InvokeError> + Send + Sync>;

/// Transaction status with the provided status value and no other data.
pub(crate) fn status(status: TxStatus) -> TransactionStatus {
    TransactionStatus {
        status,
        ..TransactionStatus::not_found()
    }
}

/// Contract metadata JSON, as rendered by the registry bindings.
pub(crate) fn metadata(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "wasm_hash": vec![id as u8; 32],
        "name": name,
        "description": format!("{name} contract"),
        "version": "1.0.0",
        "author": ACCOUNT,
        "category": 4,
        "tags": [],
        "source_url": "https://github.com/example/contracts",
        "documentation_url": "",
        "license": "MIT",
        "published_at": 1_700_000_000,
        "updated_at": 1_700_000_000,
        "total_deployments": 0,
        "verified": false
    })
}

/// Deployment record JSON with a salt filled with `id` bytes.
pub(crate) fn deployment(id: u32, contract_id: u32) -> Value {
    json!({
        "deployment_id": id,
        "contract_id": contract_id,
        "deployer": ACCOUNT,
        "deployed_contract_address": "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4",
        "deployed_at": "1700000000",
        "wasm_hash": vec![contract_id as u8; 32],
        "salt": vec![id as u8; 32]
    })
}

/// Review summary JSON.
pub(crate) fn summary(contract_id: u32, total_reviews: u32, average_rating: u32) -> Value {
    json!({
        "contract_id": contract_id,
        "total_reviews": total_reviews,
        "average_rating": average_rating,
        "rating_distribution": [0, 0, 0, total_reviews, 0]
    })
}

/// Scripted contract bindings.
pub(crate) struct MockInvoker {
    simulations: Mutex<HashMap<&'static str, Simulation>>,
    assembly_errors: Mutex<HashMap<&'static str, InvokeError>>,
    returns: Mutex<HashMap<&'static str, Value>>,
    assembled: Mutex<Vec<ContractCall>>,
    installed: AtomicBool,
}

impl MockInvoker {
    /// Bindings without scripted results, reporting every WASM hash as installed.
    pub(crate) fn new() -> Self {
        Self {
            simulations: Mutex::default(),
            assembly_errors: Mutex::default(),
            returns: Mutex::default(),
            assembled: Mutex::default(),
            installed: AtomicBool::new(true),
        }
    }

    /// Set the result of every simulation of the provided method.
    pub(crate) fn script_simulation(&self, method: &'static str, result: Result<Value, InvokeError>) {
        self.script_simulation_with(method, move |_| result.clone());
    }

    /// Compute simulation results of the provided method from the call.
    pub(crate) fn script_simulation_with<F>(&self, method: &'static str, simulation: F)
    where
        F: Fn(&ContractCall) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.simulations
            .lock()
            .unwrap()
            .insert(method, Box::new(simulation));
    }

    /// Fail transaction assembly of the provided method.
    pub(crate) fn script_assembly(&self, method: &'static str, error: InvokeError) {
        self.assembly_errors.lock().unwrap().insert(method, error);
    }

    /// Set the return value of confirmed transactions calling the provided method.
    ///
    /// Use `upload_wasm` for WASM uploads.
    pub(crate) fn script_return(&self, method: &'static str, value: Value) {
        self.returns.lock().unwrap().insert(method, value);
    }

    pub(crate) fn set_installed(&self, installed: bool) {
        self.installed.store(installed, Ordering::SeqCst);
    }

    /// Last successfully assembled call of the provided method.
    pub(crate) fn assembled_call(&self, method: &str) -> Option<ContractCall> {
        self.assembled
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|call| call.method == method)
            .cloned()
    }
}

#[async_trait]
impl ContractInvoker for MockInvoker {
    async fn simulate(&self, call: &ContractCall) -> Result<Value, InvokeError> {
        match self.simulations.lock().unwrap().get(call.method) {
            Some(simulation) => simulation(call),
            None => Err(InvokeError::Simulation(format!(
                "no simulation scripted for {}",
                call.method
            ))),
        }
    }

    async fn assemble(&self, call: &ContractCall, _source: &str) -> Result<Envelope, InvokeError> {
        if let Some(error) = self.assembly_errors.lock().unwrap().get(call.method) {
            return Err(error.clone());
        }

        self.assembled.lock().unwrap().push(call.clone());

        Ok(Envelope(call.method.to_owned()))
    }

    async fn assemble_upload(&self, _wasm: &[u8], _source: &str) -> Result<Envelope, InvokeError> {
        Ok(Envelope(UPLOAD_METHOD.to_owned()))
    }

    async fn is_installed(&self, _hash: &WasmHash) -> Result<bool, InvokeError> {
        Ok(self.installed.load(Ordering::SeqCst))
    }

    fn decode_return_value(
        &self,
        status: &TransactionStatus,
    ) -> Result<Option<Value>, InvokeError> {
        let method = status
            .return_value_xdr
            .as_deref()
            .map(|hash| hash.trim_start_matches(SIGNED_PREFIX));

        Ok(method.and_then(|method| self.returns.lock().unwrap().get(method).cloned()))
    }
}

/// Scripted network.
pub(crate) struct MockNetwork {
    send_status: Mutex<SendStatus>,
    statuses: Mutex<VecDeque<TxStatus>>,
    default_status: Mutex<TxStatus>,
    submitted: Mutex<Vec<Envelope>>,
    status_checks: AtomicU32,
}

impl MockNetwork {
    /// Network that accepts and confirms every transaction.
    pub(crate) fn new() -> Self {
        Self {
            send_status: Mutex::new(SendStatus::Pending),
            statuses: Mutex::default(),
            default_status: Mutex::new(TxStatus::Success),
            submitted: Mutex::default(),
            status_checks: AtomicU32::new(0),
        }
    }

    /// Network that accepts transactions, but never includes them into a ledger.
    pub(crate) fn pending() -> Self {
        let network = Self::new();
        *network.default_status.lock().unwrap() = TxStatus::NotFound;
        network
    }

    /// Statuses returned by the next status checks, before falling back to the default one.
    pub(crate) fn script_statuses(&self, statuses: impl IntoIterator<Item = TxStatus>) {
        self.statuses.lock().unwrap().extend(statuses);
    }

    pub(crate) fn script_send_status(&self, status: SendStatus) {
        *self.send_status.lock().unwrap() = status;
    }

    /// Signed envelopes submitted so far.
    pub(crate) fn submitted(&self) -> Vec<Envelope> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn status_checks(&self) -> u32 {
        self.status_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn send_transaction(&self, envelope: &Envelope) -> Result<Submission, NetworkError> {
        self.submitted.lock().unwrap().push(envelope.clone());

        Ok(Submission {
            hash: envelope.0.clone(),
            status: *self.send_status.lock().unwrap(),
            error_result_xdr: None,
        })
    }

    async fn get_transaction(&self, hash: &str) -> Result<TransactionStatus, NetworkError> {
        self.status_checks.fetch_add(1, Ordering::SeqCst);

        let scripted = self.statuses.lock().unwrap().pop_front();
        let status = scripted.unwrap_or(*self.default_status.lock().unwrap());

        Ok(TransactionStatus {
            status,
            ledger: (status != TxStatus::NotFound).then_some(100),
            return_value_xdr: (status == TxStatus::Success).then(|| hash.to_owned()),
            ..TransactionStatus::not_found()
        })
    }
}

/// Scripted wallet.
pub(crate) struct MockWallet {
    address: Option<String>,
    decline: bool,
}

impl MockWallet {
    /// Wallet connected to the test network that signs everything.
    pub(crate) fn connected() -> Self {
        Self::with_address(String::from(ACCOUNT))
    }

    pub(crate) fn with_address(address: String) -> Self {
        Self {
            address: Some(address),
            decline: false,
        }
    }

    pub(crate) fn disconnected() -> Self {
        Self {
            address: None,
            decline: false,
        }
    }

    /// Connected wallet whose user declines every signature request.
    pub(crate) fn declining() -> Self {
        Self {
            decline: true,
            ..Self::connected()
        }
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> Option<String> {
        self.address.clone()
    }

    fn network_passphrase(&self) -> &str {
        PASSPHRASE
    }

    async fn sign_transaction(
        &self,
        envelope: &Envelope,
        _network_passphrase: &str,
    ) -> Result<Envelope, SignError> {
        if self.decline {
            return Err(SignError::Declined);
        }

        Ok(Envelope(format!("{SIGNED_PREFIX}{}", envelope.0)))
    }
}

/// Marketplace wired to mock bindings and network, using the test configuration.
pub(crate) struct Harness {
    pub(crate) invoker: Arc<MockInvoker>,
    pub(crate) network: Arc<MockNetwork>,
    pub(crate) marketplace: Marketplace,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_network(MockNetwork::new())
    }

    fn with_network(network: MockNetwork) -> Self {
        let invoker = Arc::new(MockInvoker::new());
        let network = Arc::new(network);
        let marketplace = Marketplace::new(&Config::for_tests(), invoker.clone(), network.clone());

        Self {
            invoker,
            network,
            marketplace,
        }
    }

    /// Same harness with a network that never confirms transactions.
    pub(crate) fn with_pending_network(self) -> Self {
        let network = Arc::new(MockNetwork::pending());

        Self {
            marketplace: Marketplace::new(&Config::for_tests(), self.invoker.clone(), network.clone()),
            invoker: self.invoker,
            network,
        }
    }

    pub(crate) fn wallet(&self) -> MockWallet {
        MockWallet::connected()
    }

    pub(crate) fn pipeline<'a>(&'a self, wallet: &'a MockWallet) -> TransactionPipeline<'a> {
        self.marketplace.pipeline(wallet)
    }
}
