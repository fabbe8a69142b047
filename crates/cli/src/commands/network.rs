use std::path::PathBuf;

use common::rpc::{RpcClient, RpcError};
use derive_more::{Display, Error, From};
use indicatif::ProgressBar;

use crate::commands::load_config;

/// `network` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum NetworkError {
    /// Unable to parse the configuration with [`figment`].
    Figment(figment::Error),

    /// RPC request failed.
    Rpc(RpcError),

    /// Node reports itself as unhealthy.
    #[display(fmt = "RPC node is not healthy: {}", _0)]
    #[from(ignore)]
    Unhealthy(#[error(ignore)] String),

    /// Node serves a different network than the configured one.
    #[display(
        fmt = "RPC node serves \"{}\", but \"{}\" is configured",
        actual,
        expected
    )]
    #[from(ignore)]
    PassphraseMismatch {
        /// Passphrase reported by the node.
        actual: String,

        /// Configured passphrase.
        expected: String,
    },
}

/// Network subcommand entrypoint.
pub(crate) async fn network(config_file: Option<PathBuf>) -> Result<(), NetworkError> {
    let config = load_config(config_file)?;
    let rpc = RpcClient::new(config.network.rpc_url.as_str());

    let progress = ProgressBar::new_spinner();
    progress.set_message(format!("Connecting to {}...", rpc.url()));

    let health = rpc.health().await?;

    if !health.is_healthy() {
        progress.abandon();
        return Err(NetworkError::Unhealthy(health.status));
    }

    let info = rpc.network().await?;

    if info.passphrase != config.network.passphrase {
        progress.abandon();
        return Err(NetworkError::PassphraseMismatch {
            actual: info.passphrase,
            expected: config.network.passphrase,
        });
    }

    let ledger = rpc.latest_ledger().await?;

    progress.finish_with_message(format!(
        "Connected to \"{}\" (protocol {}), latest ledger is {}",
        info.passphrase, info.protocol_version, ledger.sequence
    ));

    Ok(())
}
