//! Wallet seam.
//!
//! Connected wallet state is always passed explicitly: every operation that needs a signer
//! takes a [`Wallet`] reference.

use async_trait::async_trait;
use common::strkey::{self, AddressKind, StrKeyError};
use derive_more::{Display, Error, From};

use crate::bindings::Envelope;

/// Signature request errors.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum SignError {
    /// User declined to sign the transaction.
    #[display(fmt = "transaction signature was declined")]
    Declined,

    /// Wallet is not able to sign right now.
    #[display(fmt = "wallet is unavailable: {}", _0)]
    Unavailable(#[error(ignore)] String),
}

/// Connected wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Connected account address, if any.
    fn address(&self) -> Option<String>;

    /// Passphrase of the network the wallet is connected to.
    fn network_passphrase(&self) -> &str;

    /// Request a signature for the provided transaction envelope.
    async fn sign_transaction(
        &self,
        envelope: &Envelope,
        network_passphrase: &str,
    ) -> Result<Envelope, SignError>;
}

/// Wallet precondition errors.
#[derive(Debug, Display, From, Error, PartialEq, Eq)]
pub enum WalletError {
    #[display(fmt = "wallet is not connected")]
    NotConnected,

    #[display(fmt = "wallet address is invalid: {}", _0)]
    InvalidAddress(StrKeyError),

    #[display(
        fmt = "wallet is connected to \"{}\", expected \"{}\"",
        wallet,
        expected
    )]
    #[from(ignore)]
    NetworkMismatch { wallet: String, expected: String },
}

/// Get the connected account address, checking that it is a valid account address and that
/// the wallet is connected to the expected network.
pub fn connected_address(wallet: &dyn Wallet, passphrase: &str) -> Result<String, WalletError> {
    let address = wallet.address().ok_or(WalletError::NotConnected)?;
    strkey::validate(AddressKind::Account, &address)?;

    if wallet.network_passphrase() != passphrase {
        return Err(WalletError::NetworkMismatch {
            wallet: wallet.network_passphrase().to_owned(),
            expected: passphrase.to_owned(),
        });
    }

    Ok(address)
}
