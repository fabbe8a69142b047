//! Deployment workflow.
//!
//! Deploying a published contract consists of the following steps:
//!
//! 1. Installing the WASM blob, if a local file was provided and its hash is not yet known
//!    to the network.
//! 2. Deploying a new contract instance with the deployment manager.
//! 3. Incrementing the deployment counter in the registry.
//!
//! The last step is best-effort: a failure is reported as a [`DeployWarning`], and the
//! deployment is still considered successful.

use std::{
    fmt::{self, Display, Formatter},
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use derive_more::{Display, Error};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    bindings::{Arg, InvokeError},
    clients::ClientError,
    context::Marketplace,
    errors::ContractError,
    model::{Bytes32ParseError, Salt, WasmHash},
    network::{SendStatus, TxStatus},
    outcome::unwrap_value,
    progress::{DeployProgress, ProgressObserver},
    transaction::{TransactionError, TransactionPipeline},
    wallet::{SignError, Wallet, WalletError},
    wasm::{WasmFile, WasmFileError},
};

/// Constructor arguments of the deployed instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitArgs {
    /// Constructor that takes a single admin address.
    Admin(String),

    /// Arbitrary constructor arguments.
    Generic(Vec<Arg>),
}

/// Deployment parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeployRequest {
    /// Published contract identifier.
    pub contract_id: u32,

    /// Hex-encoded salt. A random salt is generated if absent.
    pub salt: Option<String>,

    /// Local WASM file to install before deploying.
    pub wasm: Option<PathBuf>,

    /// Constructor arguments. Defaults to the connected account as the admin.
    pub init_args: Option<InitArgs>,
}

impl DeployRequest {
    pub fn new(contract_id: u32) -> Self {
        Self {
            contract_id,
            ..Default::default()
        }
    }
}

/// Non-fatal issue of a successful deployment.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum DeployWarning {
    #[display(fmt = "unable to update the deployment count: {}", _0)]
    BookkeepingFailed(String),

    #[display(fmt = "unable to look up the deployed contract address: {}", _0)]
    AddressLookupFailed(String),
}

/// Successful deployment result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub contract_id: u32,

    /// Deployment identifier, as returned by the deployment manager.
    pub deployment_id: String,

    /// Address of the deployed instance, if it could be looked up.
    pub deployed_address: Option<String>,
    pub wasm_hash: WasmHash,
    pub salt: Salt,

    /// Whether the WASM blob was installed as part of this deployment.
    pub installed_wasm: bool,
    pub warnings: Vec<DeployWarning>,
}

/// Broad class of a deployment failure.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Deployment can not start in the current state.
    #[display(fmt = "precondition")]
    Precondition,

    /// Provided input or network data is invalid.
    #[display(fmt = "validation")]
    Validation,

    /// Signature request failed.
    #[display(fmt = "signer")]
    Signer,

    /// Transaction or contract call failed.
    #[display(fmt = "transaction")]
    Transaction,

    /// Transaction outcome is unknown.
    #[display(fmt = "timeout")]
    Timeout,
}

/// Deployment workflow errors.
#[derive(Debug, Display, Error)]
pub enum DeployError {
    #[display(fmt = "a deployment is already in progress or completed, reset the session first")]
    NotConfiguring,

    #[display(fmt = "connect a wallet to deploy contracts")]
    WalletNotConnected,

    Wallet(WalletError),

    #[display(fmt = "invalid salt: {}", _0)]
    InvalidSalt(Bytes32ParseError),

    #[display(fmt = "invalid WASM file: {}", _0)]
    WasmFile(WasmFileError),

    /// No local file was provided and the registry WASM is not installed.
    #[display(
        fmt = "WASM {} is not installed on the network, provide the WASM file to install it",
        _0
    )]
    WasmNotInstalled(#[error(ignore)] WasmHash),

    /// Local file does not match the published contract.
    #[display(
        fmt = "WASM file hash {} does not match the published hash {}",
        local,
        registry
    )]
    RegistryHashMismatch { local: WasmHash, registry: WasmHash },

    /// Installed WASM hash differs from the local file hash.
    #[display(fmt = "installed WASM hash {} does not match {}", actual, expected)]
    HashMismatch { expected: WasmHash, actual: WasmHash },

    #[display(fmt = "malformed {} response: {}", context, value)]
    MalformedResponse {
        context: &'static str,
        value: String,
    },

    #[display(fmt = "transaction signature was declined")]
    SignatureDeclined,

    #[display(fmt = "wallet is unable to sign: {}", _0)]
    SignerUnavailable(#[error(ignore)] String),

    #[display(fmt = "transaction {} was rejected with status {}", hash, status)]
    TransactionRejected { hash: String, status: SendStatus },

    #[display(fmt = "transaction {} failed with status {}", hash, status)]
    TransactionFailed { hash: String, status: TxStatus },

    /// Transaction may still be included later.
    #[display(
        fmt = "transaction {} was not confirmed after {} attempts, check its status later",
        hash,
        attempts
    )]
    ConfirmationTimedOut { hash: String, attempts: u32 },

    Contract(ContractError),

    #[display(fmt = "unable to load contract {}: {}", contract_id, source)]
    ContractLookup {
        contract_id: u32,
        source: ClientError,
    },

    Client(ClientError),
}

impl DeployError {
    /// Failure class.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeployError::NotConfiguring
            | DeployError::WalletNotConnected
            | DeployError::Wallet(_) => ErrorCategory::Precondition,
            DeployError::InvalidSalt(_)
            | DeployError::WasmFile(_)
            | DeployError::WasmNotInstalled(_)
            | DeployError::RegistryHashMismatch { .. }
            | DeployError::HashMismatch { .. }
            | DeployError::MalformedResponse { .. }
            | DeployError::Client(ClientError::InvalidAddress(_) | ClientError::Validation(_)) => {
                ErrorCategory::Validation
            }
            DeployError::SignatureDeclined | DeployError::SignerUnavailable(_) => {
                ErrorCategory::Signer
            }
            DeployError::TransactionRejected { .. }
            | DeployError::TransactionFailed { .. }
            | DeployError::Contract(_)
            | DeployError::ContractLookup { .. }
            | DeployError::Client(_) => ErrorCategory::Transaction,
            DeployError::ConfirmationTimedOut { .. } => ErrorCategory::Timeout,
        }
    }
}

impl From<WalletError> for DeployError {
    fn from(error: WalletError) -> Self {
        match error {
            WalletError::NotConnected => DeployError::WalletNotConnected,
            error => DeployError::Wallet(error),
        }
    }
}

impl From<TransactionError> for DeployError {
    fn from(error: TransactionError) -> Self {
        match error {
            TransactionError::Signing(SignError::Declined) => DeployError::SignatureDeclined,
            TransactionError::Signing(SignError::Unavailable(reason)) => {
                DeployError::SignerUnavailable(reason)
            }
            TransactionError::Wallet(error) => error.into(),
            TransactionError::Rejected { hash, status } => {
                DeployError::TransactionRejected { hash, status }
            }
            TransactionError::Failed { hash, status } => {
                DeployError::TransactionFailed { hash, status }
            }
            TransactionError::TimedOut { hash, attempts } => {
                DeployError::ConfirmationTimedOut { hash, attempts }
            }
            error => DeployError::Client(error.into()),
        }
    }
}

impl From<ClientError> for DeployError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Contract(error) => DeployError::Contract(error),
            ClientError::Transaction(error) => error.into(),
            ClientError::Wallet(error) => error.into(),
            error => DeployError::Client(error),
        }
    }
}

impl From<InvokeError> for DeployError {
    fn from(error: InvokeError) -> Self {
        DeployError::Client(error.into())
    }
}

/// Deployment session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeployState {
    /// Waiting for a deployment request.
    Configuring {
        /// Message of the previous failed attempt.
        last_error: Option<String>,
    },

    Deploying,
    Success(DeploymentReceipt),
}

impl Default for DeployState {
    fn default() -> Self {
        DeployState::Configuring { last_error: None }
    }
}

impl Display for DeployState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeployState::Configuring { .. } => f.write_str("configuring"),
            DeployState::Deploying => f.write_str("deploying"),
            DeployState::Success(_) => f.write_str("success"),
        }
    }
}

/// Turn a deployment manager return value into a deployment id.
///
/// Scalars are printed as is, other values are serialized as JSON. A missing value is
/// replaced with `{contract_id}-{unix_millis}`.
pub fn project_deployment_id(value: Option<Value>, contract_id: u32, now: SystemTime) -> String {
    match value.map(unwrap_value) {
        None | Some(Value::Null) => {
            let millis = now
                .duration_since(UNIX_EPOCH)
                .map(|duration| duration.as_millis())
                .unwrap_or_default();

            format!("{contract_id}-{millis}")
        }
        Some(Value::String(value)) => value,
        Some(value) => value.to_string(),
    }
}

/// Deployment workflow bound to a connected wallet.
///
/// A session performs a single deployment at a time. After a successful deployment it must
/// be [reset](DeploymentSession::reset) before the next one.
pub struct DeploymentSession<'a> {
    marketplace: &'a Marketplace,
    wallet: &'a dyn Wallet,
    observer: &'a dyn ProgressObserver,
    state: DeployState,
}

impl<'a> DeploymentSession<'a> {
    pub(crate) fn new(marketplace: &'a Marketplace, wallet: &'a dyn Wallet) -> Self {
        Self {
            marketplace,
            wallet,
            observer: &crate::progress::ignore,
            state: DeployState::default(),
        }
    }

    /// Report progress to the provided observer.
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Current state.
    pub fn state(&self) -> &DeployState {
        &self.state
    }

    /// Return to the configuration state, discarding the previous result.
    pub fn reset(&mut self) {
        self.state = DeployState::default();
    }

    /// Run the deployment workflow.
    ///
    /// Only accepted in the configuration state. On failure the session returns to the
    /// configuration state, keeping the error message.
    #[instrument(skip(self), fields(contract_id = request.contract_id))]
    pub async fn deploy(&mut self, request: DeployRequest) -> Result<DeploymentReceipt, DeployError> {
        if !matches!(self.state, DeployState::Configuring { .. }) {
            return Err(DeployError::NotConfiguring);
        }

        self.state = DeployState::Deploying;

        match self.run(request).await {
            Ok(receipt) => {
                info!(deployment_id = %receipt.deployment_id, "deployment completed");

                self.state = DeployState::Success(receipt.clone());
                Ok(receipt)
            }
            Err(error) => {
                warn!(%error, category = %error.category(), "deployment failed");

                self.state = DeployState::Configuring {
                    last_error: Some(error.to_string()),
                };
                Err(error)
            }
        }
    }

    async fn run(&self, request: DeployRequest) -> Result<DeploymentReceipt, DeployError> {
        let marketplace = self.marketplace;
        let pipeline = marketplace.pipeline(self.wallet).with_observer(self.observer);

        let deployer = pipeline.source()?;

        let salt = match &request.salt {
            Some(salt) if !salt.trim().is_empty() => {
                salt.parse::<Salt>().map_err(DeployError::InvalidSalt)?
            }
            _ => Salt::random(),
        };

        let wasm = request
            .wasm
            .as_ref()
            .map(|path| WasmFile::read(path, marketplace.wasm_size_limit))
            .transpose()
            .map_err(DeployError::WasmFile)?;

        let contract = marketplace
            .registry()
            .get_contract(request.contract_id)
            .await
            .map_err(|source| DeployError::ContractLookup {
                contract_id: request.contract_id,
                source,
            })?;

        let mut installed_wasm = false;

        let wasm_hash = match wasm {
            Some(wasm) => {
                if wasm.hash != contract.wasm_hash {
                    return Err(DeployError::RegistryHashMismatch {
                        local: wasm.hash,
                        registry: contract.wasm_hash,
                    });
                }

                if !marketplace.invoker.is_installed(&wasm.hash).await? {
                    self.install(&pipeline, &deployer, &wasm).await?;
                    installed_wasm = true;
                }

                wasm.hash
            }
            None => {
                if !marketplace.invoker.is_installed(&contract.wasm_hash).await? {
                    return Err(DeployError::WasmNotInstalled(contract.wasm_hash));
                }

                contract.wasm_hash
            }
        };

        self.observer.notify(&DeployProgress::Deploying);

        let deployments = marketplace.deployments();
        let value = match request
            .init_args
            .unwrap_or_else(|| InitArgs::Admin(deployer.clone()))
        {
            InitArgs::Admin(admin) => {
                deployments
                    .deploy_with_admin(&pipeline, request.contract_id, wasm_hash, salt, &admin)
                    .await?
            }
            InitArgs::Generic(args) => {
                deployments
                    .deploy_from_wasm(&pipeline, request.contract_id, wasm_hash, salt, args)
                    .await?
            }
        };

        let deployment_id =
            project_deployment_id(value, request.contract_id, SystemTime::now());

        let mut warnings = Vec::new();

        let deployed_address = match deployment_id.parse() {
            Ok(id) => match deployments.get_deployment(id).await {
                Ok(record) => Some(record.deployed_contract_address),
                Err(error) => {
                    warn!(%error, deployment_id = id, "unable to look up deployed address");
                    warnings.push(DeployWarning::AddressLookupFailed(error.to_string()));
                    None
                }
            },
            Err(_) => None,
        };

        self.observer.notify(&DeployProgress::UpdatingRegistry);

        if let Err(error) = marketplace
            .registry()
            .increment_deployment_count(&pipeline, request.contract_id)
            .await
        {
            warn!(%error, "unable to increment deployment count");
            warnings.push(DeployWarning::BookkeepingFailed(error.to_string()));
        }

        Ok(DeploymentReceipt {
            contract_id: request.contract_id,
            deployment_id,
            deployed_address,
            wasm_hash,
            salt,
            installed_wasm,
            warnings,
        })
    }

    /// Upload the WASM blob and check that the network reports the same hash.
    async fn install(
        &self,
        pipeline: &TransactionPipeline<'_>,
        source: &str,
        wasm: &WasmFile,
    ) -> Result<(), DeployError> {
        self.observer.notify(&DeployProgress::InstallingWasm);

        info!(hash = %wasm.hash, size = wasm.bytes.len(), "installing WASM");

        let envelope = self
            .marketplace
            .invoker
            .assemble_upload(&wasm.bytes, source)
            .await?;

        let confirmed = pipeline.sign_and_send(envelope).await?;

        let value = confirmed
            .return_value
            .map(unwrap_value)
            .ok_or_else(|| DeployError::MalformedResponse {
                context: "WASM upload",
                value: String::from("no return value"),
            })?;

        let installed: WasmHash =
            serde_json::from_value(value.clone()).map_err(|_| DeployError::MalformedResponse {
                context: "WASM upload",
                value: value.to_string(),
            })?;

        if installed != wasm.hash {
            return Err(DeployError::HashMismatch {
                expected: wasm.hash,
                actual: installed,
            });
        }

        info!(hash = %installed, "WASM installed");

        Ok(())
    }
}
