//! Typed clients of the marketplace contracts.
//!
//! Contract error codes are mapped to [`ContractError`] here, so that callers never see raw
//! codes without the contract that produced them.

use derive_more::{Display, Error, From};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    bindings::{ContractCall, ContractInvoker, InvokeError},
    errors::{ContractError, ContractKind},
    outcome::{decode_outcome, ChainOutcome, DecodeError},
    transaction::{TransactionError, TransactionPipeline},
    validation::ValidationError,
    wallet::WalletError,
};

mod deployments;
mod registry;
mod reviews;

pub use deployments::DeploymentManagerClient;
pub use registry::RegistryClient;
pub use reviews::ReviewSystemClient;

/// Contract client errors.
#[derive(Debug, Display, From, Error)]
pub enum ClientError {
    /// Contract returned an error code.
    Contract(ContractError),

    /// Unable to build or simulate a call.
    Invoke(InvokeError),

    Transaction(TransactionError),

    /// Contract returned a value of an unexpected shape.
    Decode(DecodeError),

    Wallet(WalletError),

    /// Input was rejected before any network call.
    Validation(ValidationError),

    /// Address argument is not a valid strkey.
    #[display(fmt = "invalid address: {}", _0)]
    InvalidAddress(common::strkey::StrKeyError),
}

impl ClientError {
    /// Contract error, if the failure was caused by one.
    pub fn contract_error(&self) -> Option<&ContractError> {
        match self {
            ClientError::Contract(error) => Some(error),
            _ => None,
        }
    }
}

/// Shared plumbing of a single contract client.
#[derive(Clone, Copy)]
pub(crate) struct ContractClient<'a> {
    invoker: &'a dyn ContractInvoker,
    address: &'a str,
    kind: ContractKind,
}

impl<'a> ContractClient<'a> {
    pub(crate) fn new(invoker: &'a dyn ContractInvoker, address: &'a str, kind: ContractKind) -> Self {
        Self {
            invoker,
            address,
            kind,
        }
    }

    /// Contract address.
    pub(crate) fn address(&self) -> &str {
        self.address
    }

    /// Start building a call of the provided method.
    pub(crate) fn call(&self, method: &'static str) -> ContractCall {
        ContractCall::new(self.address, method)
    }

    /// Map a binding error, extracting the contract error code if possible.
    fn invoke_error(&self, error: InvokeError) -> ClientError {
        match error.contract_code() {
            Some(code) => ContractError::new(self.kind, code).into(),
            None => error.into(),
        }
    }

    fn transaction_error(&self, error: TransactionError) -> ClientError {
        match error.contract_code() {
            Some(code) => ContractError::new(self.kind, code).into(),
            None => error.into(),
        }
    }

    /// Decode a contract result, mapping `Err` variants to contract errors.
    pub(crate) fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, ClientError> {
        match decode_outcome(value)? {
            ChainOutcome::Ok(value) => Ok(value),
            ChainOutcome::Err(code) => Err(ContractError::new(self.kind, code).into()),
        }
    }

    /// Perform a read-only call.
    pub(crate) async fn read<T: DeserializeOwned>(&self, call: ContractCall) -> Result<T, ClientError> {
        debug!(contract = %self.kind, method = call.method, "simulating contract call");

        let value = self
            .invoker
            .simulate(&call)
            .await
            .map_err(|error| self.invoke_error(error))?;

        self.decode(value)
    }

    /// Perform a write call and decode its return value.
    ///
    /// A confirmed transaction without a return value decodes as JSON `null`.
    pub(crate) async fn write<T: DeserializeOwned>(
        &self,
        pipeline: &TransactionPipeline<'_>,
        call: ContractCall,
    ) -> Result<T, ClientError> {
        debug!(contract = %self.kind, method = call.method, "invoking contract call");

        let confirmed = pipeline
            .invoke(&call)
            .await
            .map_err(|error| self.transaction_error(error))?;

        self.decode(confirmed.return_value.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        errors::{ContractErrorKind, RegistryError},
        testing::MockInvoker,
    };

    #[tokio::test]
    async fn error_codes_are_mapped_per_contract() {
        let invoker = MockInvoker::new();
        invoker.script_simulation("get_contract", Ok(json!({ "Err": 2 })));

        let client = ContractClient::new(&invoker, "CREGISTRY", ContractKind::Registry);
        let error = client
            .read::<Value>(client.call("get_contract").arg(9u32))
            .await
            .unwrap_err();

        assert_eq!(
            error.contract_error().map(ContractError::kind),
            Some(ContractErrorKind::Registry(RegistryError::ContractNotFound))
        );
    }

    #[tokio::test]
    async fn simulation_errors_are_mapped() {
        let invoker = MockInvoker::new();
        invoker.script_simulation(
            "get_contract",
            Err(InvokeError::Simulation(String::from(
                "HostError: Error(Contract, #2)",
            ))),
        );

        let client = ContractClient::new(&invoker, "CREVIEWS", ContractKind::ReviewSystem);
        let error = client
            .read::<Value>(client.call("get_contract"))
            .await
            .unwrap_err();

        assert_eq!(
            error.contract_error(),
            Some(&ContractError::new(ContractKind::ReviewSystem, 2))
        );
    }

    #[tokio::test]
    async fn transport_errors_are_kept() {
        let invoker = MockInvoker::new();
        invoker.script_simulation(
            "get_contract_count",
            Err(InvokeError::Transport(String::from("connection refused"))),
        );

        let client = ContractClient::new(&invoker, "CREGISTRY", ContractKind::Registry);

        assert!(matches!(
            client.read::<u32>(client.call("get_contract_count")).await,
            Err(ClientError::Invoke(InvokeError::Transport(_)))
        ));
    }
}
