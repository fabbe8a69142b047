use common::strkey;
use serde_json::Value;
use tracing::info;

use super::{ClientError, ContractClient};
use crate::{
    bindings::{Arg, ContractCall},
    model::{DeploymentRecord, Salt, WasmHash},
    transaction::TransactionPipeline,
};

/// Deployment manager client.
pub struct DeploymentManagerClient<'a> {
    pub(crate) inner: ContractClient<'a>,
}

impl DeploymentManagerClient<'_> {
    /// Deployment manager contract address.
    pub fn address(&self) -> &str {
        self.inner.address()
    }

    /// Deploy a contract instance whose constructor takes a single admin address.
    ///
    /// The admin may be either an account or a contract. Returns the raw deployment id
    /// value, which is kept undecoded since bindings render it inconsistently.
    pub async fn deploy_with_admin(
        &self,
        pipeline: &TransactionPipeline<'_>,
        contract_id: u32,
        wasm_hash: WasmHash,
        salt: Salt,
        admin: &str,
    ) -> Result<Option<Value>, ClientError> {
        strkey::validate_any(admin).map_err(ClientError::InvalidAddress)?;

        let deployer = pipeline.source()?;
        let call = self
            .inner
            .call("deploy_with_admin")
            .arg(contract_id)
            .arg(Arg::Address(deployer))
            .arg(wasm_hash)
            .arg(Arg::Bytes32(salt.0))
            .arg(Arg::Address(admin.to_owned()));

        self.deploy(pipeline, call).await
    }

    /// Deploy a contract instance with arbitrary constructor arguments.
    pub async fn deploy_from_wasm(
        &self,
        pipeline: &TransactionPipeline<'_>,
        contract_id: u32,
        wasm_hash: WasmHash,
        salt: Salt,
        init_args: Vec<Arg>,
    ) -> Result<Option<Value>, ClientError> {
        let deployer = pipeline.source()?;
        let call = self
            .inner
            .call("deploy_from_wasm")
            .arg(contract_id)
            .arg(Arg::Address(deployer))
            .arg(wasm_hash)
            .arg(Arg::Bytes32(salt.0))
            .arg(Arg::Vec(init_args));

        self.deploy(pipeline, call).await
    }

    async fn deploy(
        &self,
        pipeline: &TransactionPipeline<'_>,
        call: ContractCall,
    ) -> Result<Option<Value>, ClientError> {
        let value: Value = self.inner.write(pipeline, call).await?;

        info!(deployment_id = %value, "contract instance deployed");

        Ok(Some(value).filter(|value| !value.is_null()))
    }

    pub async fn get_deployment(&self, deployment_id: u32) -> Result<DeploymentRecord, ClientError> {
        self.inner
            .read(self.inner.call("get_deployment").arg(deployment_id))
            .await
    }

    /// Deployments made by the provided account.
    pub async fn get_deployment_history(
        &self,
        deployer: &str,
    ) -> Result<Vec<DeploymentRecord>, ClientError> {
        self.inner
            .read(
                self.inner
                    .call("get_deployment_history")
                    .arg(Arg::Address(deployer.to_owned())),
            )
            .await
    }

    /// Deployments of the provided published contract.
    pub async fn get_contract_deployments(
        &self,
        contract_id: u32,
    ) -> Result<Vec<DeploymentRecord>, ClientError> {
        self.inner
            .read(self.inner.call("get_contract_deployments").arg(contract_id))
            .await
    }

    pub async fn get_all_deployments(&self) -> Result<Vec<DeploymentRecord>, ClientError> {
        self.inner.read(self.inner.call("get_all_deployments")).await
    }

    pub async fn get_total_deployments(&self) -> Result<u32, ClientError> {
        self.inner
            .read(self.inner.call("get_total_deployments"))
            .await
    }
}
