//! Write transaction pipeline: assemble, sign, submit and poll until a terminal status.

use derive_more::{Display, Error, From};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    bindings::{ContractCall, ContractInvoker, Envelope, InvokeError},
    network::{Network, NetworkError, SendStatus, TxStatus},
    poll::{await_confirmation, PollConfig, PollError},
    progress::{DeployProgress, ProgressObserver},
    wallet::{connected_address, SignError, Wallet, WalletError},
};

/// Transaction pipeline errors.
#[derive(Debug, Display, From, Error)]
pub enum TransactionError {
    /// Unable to build or simulate the transaction.
    Invoke(InvokeError),

    Signing(SignError),
    Network(NetworkError),
    Wallet(WalletError),

    /// Node refused to accept the transaction.
    #[display(fmt = "transaction {} was rejected with status {}", hash, status)]
    #[from(ignore)]
    Rejected { hash: String, status: SendStatus },

    /// Transaction was included into a ledger, but failed.
    #[display(fmt = "transaction {} failed with status {}", hash, status)]
    #[from(ignore)]
    Failed { hash: String, status: TxStatus },

    /// Confirmation is inconclusive: the transaction may still succeed later.
    #[display(
        fmt = "transaction {} was not confirmed after {} attempts",
        hash,
        attempts
    )]
    #[from(ignore)]
    TimedOut { hash: String, attempts: u32 },
}

impl From<PollError> for TransactionError {
    fn from(error: PollError) -> Self {
        match error {
            PollError::Network(error) => TransactionError::Network(error),
            PollError::TimedOut { hash, attempts } => TransactionError::TimedOut { hash, attempts },
        }
    }
}

impl TransactionError {
    /// Contract error code, if the transaction failed because of one.
    pub fn contract_code(&self) -> Option<u32> {
        match self {
            TransactionError::Invoke(error) => error.contract_code(),
            _ => None,
        }
    }
}

/// Successfully confirmed transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Confirmed {
    /// Transaction hash.
    pub hash: String,

    /// Ledger the transaction was included in.
    pub ledger: Option<u32>,

    /// Decoded contract return value.
    pub return_value: Option<Value>,
}

/// Signs, submits and confirms transactions on behalf of a connected wallet.
pub struct TransactionPipeline<'a> {
    pub(crate) invoker: &'a dyn ContractInvoker,
    pub(crate) network: &'a dyn Network,
    pub(crate) wallet: &'a dyn Wallet,
    pub(crate) passphrase: &'a str,
    pub(crate) poll: PollConfig,
    pub(crate) observer: &'a dyn ProgressObserver,
}

impl<'a> TransactionPipeline<'a> {
    /// Create a new pipeline.
    pub fn new(
        invoker: &'a dyn ContractInvoker,
        network: &'a dyn Network,
        wallet: &'a dyn Wallet,
        passphrase: &'a str,
        poll: PollConfig,
    ) -> Self {
        Self {
            invoker,
            network,
            wallet,
            passphrase,
            poll,
            observer: &crate::progress::ignore,
        }
    }

    /// Report progress to the provided observer.
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Connected account, used as the transaction source.
    pub fn source(&self) -> Result<String, WalletError> {
        connected_address(self.wallet, self.passphrase)
    }

    /// Sign an assembled envelope, submit it and wait for a terminal status.
    #[instrument(skip_all)]
    pub async fn sign_and_send(&self, envelope: Envelope) -> Result<Confirmed, TransactionError> {
        self.observer.notify(&DeployProgress::AwaitingSignature);

        let signed = self
            .wallet
            .sign_transaction(&envelope, self.passphrase)
            .await?;

        let submission = self.network.send_transaction(&signed).await?;

        if !submission.status.is_accepted() {
            warn!(hash = %submission.hash, status = %submission.status, "transaction was rejected");

            return Err(TransactionError::Rejected {
                hash: submission.hash,
                status: submission.status,
            });
        }

        info!(hash = %submission.hash, "transaction submitted");

        self.observer.notify(&DeployProgress::Submitted {
            hash: submission.hash.clone(),
        });

        let max_attempts = self.poll.max_attempts;
        let status = await_confirmation(self.network, &submission.hash, self.poll, |attempt| {
            self.observer.notify(&DeployProgress::Confirming {
                attempt,
                max_attempts,
            })
        })
        .await?;

        if status.status != TxStatus::Success {
            warn!(hash = %submission.hash, status = %status.status, "transaction failed");

            return Err(TransactionError::Failed {
                hash: submission.hash,
                status: status.status,
            });
        }

        let return_value = self.invoker.decode_return_value(&status)?;

        Ok(Confirmed {
            hash: submission.hash,
            ledger: status.ledger,
            return_value,
        })
    }

    /// Assemble a contract call, then sign, submit and confirm it.
    pub async fn invoke(&self, call: &ContractCall) -> Result<Confirmed, TransactionError> {
        let source = self.source()?;
        let envelope = self.invoker.assemble(call, &source).await?;

        self.sign_and_send(envelope).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::testing::{MockInvoker, MockNetwork, MockWallet, ACCOUNT, PASSPHRASE};

    fn call() -> ContractCall {
        ContractCall::new("CREGISTRY", "verify_contract")
            .arg(1u32)
            .arg(crate::bindings::Arg::Address(String::from(ACCOUNT)))
    }

    fn fast() -> PollConfig {
        PollConfig {
            interval: std::time::Duration::ZERO,
            max_attempts: 30,
        }
    }

    #[tokio::test]
    async fn confirmed_write() {
        let invoker = MockInvoker::new();
        let network = MockNetwork::new();
        let wallet = MockWallet::connected();

        invoker.script_return("verify_contract", json!({ "value": null }));
        network.script_statuses([TxStatus::NotFound, TxStatus::Success]);

        let events = Mutex::new(Vec::new());
        let observer = |progress: &DeployProgress| events.lock().unwrap().push(progress.clone());

        let confirmed = TransactionPipeline::new(&invoker, &network, &wallet, PASSPHRASE, fast())
            .with_observer(&observer)
            .invoke(&call())
            .await
            .unwrap();

        assert_eq!(confirmed.return_value, Some(json!({ "value": null })));
        assert_eq!(network.submitted().len(), 1);

        let events = events.into_inner().unwrap();
        assert_eq!(events[0], DeployProgress::AwaitingSignature);
        assert!(matches!(events[1], DeployProgress::Submitted { .. }));
        assert_eq!(
            events.last(),
            Some(&DeployProgress::Confirming {
                attempt: 2,
                max_attempts: 30
            })
        );
    }

    #[tokio::test]
    async fn declined_signature_is_not_submitted() {
        let invoker = MockInvoker::new();
        let network = MockNetwork::new();
        let wallet = MockWallet::declining();

        let result = TransactionPipeline::new(&invoker, &network, &wallet, PASSPHRASE, fast())
            .invoke(&call())
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::Signing(SignError::Declined))
        ));
        assert!(network.submitted().is_empty());
    }

    #[tokio::test]
    async fn failed_on_chain() {
        let invoker = MockInvoker::new();
        let network = MockNetwork::new();
        let wallet = MockWallet::connected();

        network.script_statuses([TxStatus::Failed]);

        let result = TransactionPipeline::new(&invoker, &network, &wallet, PASSPHRASE, fast())
            .invoke(&call())
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::Failed {
                status: TxStatus::Failed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn rejected_submission() {
        let invoker = MockInvoker::new();
        let network = MockNetwork::new();
        let wallet = MockWallet::connected();

        network.script_send_status(SendStatus::Error);

        let result = TransactionPipeline::new(&invoker, &network, &wallet, PASSPHRASE, fast())
            .invoke(&call())
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::Rejected {
                status: SendStatus::Error,
                ..
            })
        ));
        assert_eq!(network.status_checks(), 0);
    }

    #[tokio::test]
    async fn disconnected_wallet() {
        let invoker = MockInvoker::new();
        let network = MockNetwork::new();
        let wallet = MockWallet::disconnected();

        let result = TransactionPipeline::new(&invoker, &network, &wallet, PASSPHRASE, fast())
            .invoke(&call())
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::Wallet(WalletError::NotConnected))
        ));
    }
}
