//! # Marketplace CLI
//!
//! Operator tooling for the Soroban contract marketplace: computing WASM hashes of contracts
//! before publishing them, generating deployment salts, checking the configured RPC node and
//! following transactions until they are confirmed.
//!
//! Commands that talk to the network read the `Marketplace.toml` configuration file, see
//! [`common::config::Config`] for the available options.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use clap::Parser;
use commands::{Cli, Commands};

/// CLI subcommands.
mod commands;

/// CLI entrypoint.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let Cli {
        config_file,
        command,
    } = Cli::parse();

    match command {
        Commands::Hash(args) => commands::hash(args)?,
        Commands::Salt => commands::salt(),
        Commands::Network => commands::network(config_file).await?,
        Commands::Status(args) => commands::status(config_file, args).await?,
        Commands::Submit(args) => commands::submit(config_file, args).await?,
    }

    Ok(())
}
