use std::{path::PathBuf, time::Duration};

use common::rpc::RpcClient;
use derive_more::{Display, Error, From};
use indicatif::ProgressBar;
use marketplace::{
    network::{TransactionStatus, TxStatus},
    poll::{await_confirmation, PollConfig, PollError},
};

use crate::commands::{load_config, Status};

/// `status` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum StatusError {
    /// Unable to parse the configuration with [`figment`].
    Figment(figment::Error),

    /// Status polling failed.
    Poll(PollError),

    /// Transaction was included, but failed.
    #[display(fmt = "transaction {} failed", _0)]
    #[from(ignore)]
    Failed(#[error(ignore)] String),
}

/// Status subcommand entrypoint.
pub(crate) async fn status(
    config_file: Option<PathBuf>,
    Status { hash }: Status,
) -> Result<(), StatusError> {
    let config = load_config(config_file)?;
    let rpc = RpcClient::new(config.network.rpc_url.as_str());

    follow(&rpc, &hash, PollConfig::from(&config.polling)).await
}

/// Poll the transaction with a spinner until it reaches a terminal status.
pub(crate) async fn follow(
    rpc: &RpcClient,
    hash: &str,
    poll: PollConfig,
) -> Result<(), StatusError> {
    let progress = ProgressBar::new_spinner();
    progress.enable_steady_tick(Duration::from_millis(150));

    let result = await_confirmation(rpc, hash, poll, |attempt| {
        progress.set_message(format!(
            "Waiting for transaction {hash} ({attempt}/{})...",
            poll.max_attempts
        ))
    })
    .await;

    let status = match result {
        Ok(status) => status,
        Err(error) => {
            progress.abandon();
            return Err(error.into());
        }
    };

    match status {
        TransactionStatus {
            status: TxStatus::Success,
            ledger,
            ..
        } => {
            let ledger = ledger.map(|ledger| ledger.to_string()).unwrap_or_default();
            progress.finish_with_message(format!("Transaction {hash} confirmed in ledger {ledger}"));
            Ok(())
        }
        _ => {
            progress.abandon();
            Err(StatusError::Failed(hash.to_owned()))
        }
    }
}
