/// `hash` subcommand.
mod hash;

/// `network` subcommand.
mod network;

/// `salt` subcommand.
mod salt;

/// `status` subcommand.
mod status;

/// `submit` subcommand.
mod submit;

pub(crate) use hash::hash;
pub(crate) use network::network;
pub(crate) use salt::salt;
pub(crate) use status::status;
pub(crate) use submit::submit;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use common::{config::Config, logging};

/// CLI configuration.
#[derive(Parser)]
#[command(about)]
pub(crate) struct Cli {
    /// Configuration file path.
    #[arg(short, long = "config")]
    pub config_file: Option<PathBuf>,

    /// Selected subcommand.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Validate a WASM file and print its hash.
    Hash(Hash),

    /// Print a random deployment salt.
    Salt,

    /// Check health and passphrase of the configured RPC node.
    Network,

    /// Wait until a transaction is confirmed.
    Status(Status),

    /// Submit a signed transaction envelope and wait for its confirmation.
    Submit(Submit),
}

/// `hash` subcommand configuration.
#[derive(Args)]
pub struct Hash {
    /// Path to the WASM file.
    pub file: PathBuf,

    /// Maximum accepted file size in bytes.
    #[arg(short, long)]
    pub max_size: Option<usize>,
}

/// `status` subcommand configuration.
#[derive(Args)]
pub struct Status {
    /// Hex-encoded transaction hash.
    pub hash: String,
}

/// `submit` subcommand configuration.
#[derive(Args)]
pub struct Submit {
    /// Base64-encoded signed transaction envelope XDR.
    pub xdr: String,
}

/// Load the configuration and install the log subscriber.
pub(crate) fn load_config(config_file: Option<PathBuf>) -> Result<Config, figment::Error> {
    let config = Config::new(config_file)?;
    logging::init(&config);
    Ok(config)
}
