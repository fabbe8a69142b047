//! Client-side toolkit of the Soroban contract marketplace.
//!
//! The marketplace consists of three smart contracts: a registry of published contracts,
//! a deployment manager that deploys instances of published contracts, and a review system.
//! This crate talks to them through three seams:
//!
//! * [`ContractInvoker`], implemented by generated contract bindings, which builds and
//!   simulates contract calls,
//! * [`Wallet`], which provides the connected account and signs transactions,
//! * [`Network`], which submits transactions and reports their status.
//!
//! On top of these, [`Marketplace`] provides typed contract clients and the
//! [`DeploymentSession`] workflow.

pub mod bindings;
pub mod catalog;
pub mod clients;
pub mod context;
pub mod deploy;
pub mod errors;
pub mod model;
pub mod network;
pub mod notification;
pub mod outcome;
pub mod poll;
pub mod progress;
pub mod transaction;
pub mod validation;
pub mod wallet;
pub mod wasm;

#[cfg(test)]
mod testing;

pub use bindings::ContractInvoker;
pub use context::Marketplace;
pub use deploy::{DeployError, DeployRequest, DeployState, DeploymentReceipt, DeploymentSession};
pub use network::Network;
pub use wallet::Wallet;
