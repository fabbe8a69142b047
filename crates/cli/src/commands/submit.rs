use std::path::PathBuf;

use common::rpc::RpcClient;
use derive_more::{Display, Error, From};
use marketplace::{
    bindings::Envelope,
    network::{Network, NetworkError, SendStatus},
    poll::PollConfig,
};

use crate::commands::{
    load_config,
    status::{follow, StatusError},
    Submit,
};

/// `submit` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum SubmitError {
    /// Unable to parse the configuration with [`figment`].
    Figment(figment::Error),

    /// Transaction submission failed.
    Network(NetworkError),

    /// Node did not accept the transaction.
    #[display(fmt = "transaction {} was rejected with {:?} status", hash, status)]
    #[from(ignore)]
    Rejected {
        /// Transaction hash.
        hash: String,

        /// Submission status reported by the node.
        #[error(ignore)]
        status: SendStatus,
    },

    /// Transaction was accepted, but not confirmed.
    Status(StatusError),
}

/// Submit subcommand entrypoint.
pub(crate) async fn submit(
    config_file: Option<PathBuf>,
    Submit { xdr }: Submit,
) -> Result<(), SubmitError> {
    let config = load_config(config_file)?;
    let rpc = RpcClient::new(config.network.rpc_url.as_str());

    let submission = Network::send_transaction(&rpc, &Envelope(xdr)).await?;

    if !submission.status.is_accepted() {
        return Err(SubmitError::Rejected {
            hash: submission.hash,
            status: submission.status,
        });
    }

    println!("Transaction hash: {}", submission.hash);

    follow(&rpc, &submission.hash, PollConfig::from(&config.polling)).await?;

    Ok(())
}
