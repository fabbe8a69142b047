use std::sync::Arc;

use common::config::{Config, Contracts};

use crate::{
    bindings::ContractInvoker,
    clients::{ContractClient, DeploymentManagerClient, RegistryClient, ReviewSystemClient},
    deploy::DeploymentSession,
    errors::ContractKind,
    network::Network,
    poll::PollConfig,
    transaction::TransactionPipeline,
    wallet::Wallet,
};

/// Marketplace contracts together with the network they are deployed to.
pub struct Marketplace {
    pub(crate) invoker: Arc<dyn ContractInvoker>,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) contracts: Contracts,
    pub(crate) passphrase: String,
    pub(crate) poll: PollConfig,
    pub(crate) wasm_size_limit: usize,
}

impl Marketplace {
    pub fn new(
        config: &Config,
        invoker: Arc<dyn ContractInvoker>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            invoker,
            network,
            contracts: config.contracts.clone(),
            passphrase: config.network.passphrase.clone(),
            poll: PollConfig::from(&config.polling),
            wasm_size_limit: config.deploy.wasm_size_limit,
        }
    }

    /// Network passphrase transactions are signed for.
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn registry(&self) -> RegistryClient<'_> {
        RegistryClient {
            inner: ContractClient::new(
                self.invoker.as_ref(),
                &self.contracts.registry,
                ContractKind::Registry,
            ),
        }
    }

    pub fn deployments(&self) -> DeploymentManagerClient<'_> {
        DeploymentManagerClient {
            inner: ContractClient::new(
                self.invoker.as_ref(),
                &self.contracts.deployment_manager,
                ContractKind::DeploymentManager,
            ),
        }
    }

    pub fn reviews(&self) -> ReviewSystemClient<'_> {
        ReviewSystemClient {
            inner: ContractClient::new(
                self.invoker.as_ref(),
                &self.contracts.review_system,
                ContractKind::ReviewSystem,
            ),
        }
    }

    /// Transaction pipeline that signs with the provided wallet.
    pub fn pipeline<'a>(&'a self, wallet: &'a dyn Wallet) -> TransactionPipeline<'a> {
        TransactionPipeline::new(
            self.invoker.as_ref(),
            self.network.as_ref(),
            wallet,
            &self.passphrase,
            self.poll,
        )
    }

    /// New deployment workflow session for the provided wallet.
    pub fn deployment_session<'a>(&'a self, wallet: &'a dyn Wallet) -> DeploymentSession<'a> {
        DeploymentSession::new(self, wallet)
    }
}
