use common::strkey::{self, AddressKind};
use tracing::info;

use super::{ClientError, ContractClient};
use crate::{
    bindings::Arg,
    model::{Category, ContractMetadata, MetadataUpdate, PublishParams},
    transaction::TransactionPipeline,
    validation::{validate_publish, validate_update},
};

impl From<&PublishParams> for Arg {
    fn from(params: &PublishParams) -> Self {
        Arg::Struct(vec![
            (String::from("wasm_hash"), params.wasm_hash.into()),
            (String::from("name"), Arg::String(params.name.clone())),
            (
                String::from("description"),
                Arg::String(params.description.clone()),
            ),
            (String::from("version"), Arg::String(params.version.clone())),
            (String::from("category"), params.category.into()),
            (String::from("tags"), params.tags.clone().into()),
            (
                String::from("source_url"),
                Arg::String(params.source_url.clone()),
            ),
            (
                String::from("documentation_url"),
                Arg::String(params.documentation_url.clone()),
            ),
            (String::from("license"), Arg::String(params.license.clone())),
        ])
    }
}

impl From<Category> for Arg {
    fn from(category: Category) -> Self {
        Arg::U32(category.index())
    }
}

/// Contract registry client.
pub struct RegistryClient<'a> {
    pub(crate) inner: ContractClient<'a>,
}

impl RegistryClient<'_> {
    /// Registry contract address.
    pub fn address(&self) -> &str {
        self.inner.address()
    }

    /// Publish a new contract, authored by the connected account. Returns the new contract id.
    pub async fn publish_contract(
        &self,
        pipeline: &TransactionPipeline<'_>,
        params: &PublishParams,
    ) -> Result<u32, ClientError> {
        validate_publish(params)?;

        let author = pipeline.source()?;
        let call = self
            .inner
            .call("publish_contract")
            .arg(Arg::Address(author))
            .arg(params);

        let contract_id = self.inner.write(pipeline, call).await?;

        info!(contract_id, name = %params.name, "contract published");

        Ok(contract_id)
    }

    /// Update metadata of a contract authored by the connected account.
    pub async fn update_metadata(
        &self,
        pipeline: &TransactionPipeline<'_>,
        contract_id: u32,
        update: &MetadataUpdate,
    ) -> Result<(), ClientError> {
        validate_update(update)?;

        let call = self
            .inner
            .call("update_metadata")
            .arg(contract_id)
            .arg(update.description.clone().map(Arg::String))
            .arg(update.documentation_url.clone().map(Arg::String))
            .arg(update.tags.clone());

        self.inner.write(pipeline, call).await
    }

    pub async fn get_contract(&self, contract_id: u32) -> Result<ContractMetadata, ClientError> {
        self.inner
            .read(self.inner.call("get_contract").arg(contract_id))
            .await
    }

    pub async fn get_all_contracts(&self) -> Result<Vec<ContractMetadata>, ClientError> {
        self.inner.read(self.inner.call("get_all_contracts")).await
    }

    pub async fn search_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<ContractMetadata>, ClientError> {
        self.inner
            .read(self.inner.call("search_by_category").arg(category))
            .await
    }

    /// Find contracts with a tag exactly matching the provided one.
    pub async fn search_by_tag(&self, tag: &str) -> Result<Vec<ContractMetadata>, ClientError> {
        self.inner
            .read(
                self.inner
                    .call("search_by_tag")
                    .arg(Arg::String(tag.to_owned())),
            )
            .await
    }

    /// Mark a contract as verified by the provided auditor.
    pub async fn verify_contract(
        &self,
        pipeline: &TransactionPipeline<'_>,
        contract_id: u32,
        auditor: &str,
    ) -> Result<(), ClientError> {
        strkey::validate(AddressKind::Account, auditor).map_err(ClientError::InvalidAddress)?;

        let call = self
            .inner
            .call("verify_contract")
            .arg(contract_id)
            .arg(Arg::Address(auditor.to_owned()));

        self.inner.write(pipeline, call).await
    }

    /// Increment the deployment counter of a contract on behalf of the connected account.
    pub async fn increment_deployment_count(
        &self,
        pipeline: &TransactionPipeline<'_>,
        contract_id: u32,
    ) -> Result<(), ClientError> {
        let caller = pipeline.source()?;
        let call = self
            .inner
            .call("increment_deployment_count")
            .arg(contract_id)
            .arg(Arg::Address(caller));

        self.inner.write(pipeline, call).await
    }

    /// Total number of published contracts.
    pub async fn get_contract_count(&self) -> Result<u32, ClientError> {
        self.inner.read(self.inner.call("get_contract_count")).await
    }
}
