//! User-facing notifications.

use derive_more::Display;

use crate::{
    clients::ClientError,
    deploy::{DeployError, DeployWarning, DeploymentReceipt, ErrorCategory},
};

/// Notification severity.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Level {
    #[display(fmt = "success")]
    Success,

    #[display(fmt = "info")]
    Info,

    #[display(fmt = "warning")]
    Warning,

    #[display(fmt = "error")]
    Error,
}

/// Message shown to the user.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display(fmt = "[{}] {}", level, message)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Notifications that describe a successful deployment, followed by its warnings.
    pub fn for_receipt(receipt: &DeploymentReceipt) -> Vec<Self> {
        let mut message = format!(
            "Contract deployed successfully! Deployment ID: {}",
            receipt.deployment_id
        );

        if let Some(address) = &receipt.deployed_address {
            message.push_str(&format!(", address: {address}"));
        }

        std::iter::once(Notification::new(Level::Success, message))
            .chain(receipt.warnings.iter().map(Notification::from))
            .collect()
    }
}

impl From<&DeployWarning> for Notification {
    fn from(warning: &DeployWarning) -> Self {
        Notification::new(Level::Warning, warning.to_string())
    }
}

impl From<&DeployError> for Notification {
    fn from(error: &DeployError) -> Self {
        let level = match error.category() {
            // Transaction may still succeed, so this is not reported as a failure.
            ErrorCategory::Timeout => Level::Warning,
            ErrorCategory::Signer if matches!(error, DeployError::SignatureDeclined) => Level::Info,
            _ => Level::Error,
        };

        let message = match error {
            DeployError::Contract(error) => error.kind().description().to_owned(),
            error => error.to_string(),
        };

        Notification::new(level, message)
    }
}

impl From<&ClientError> for Notification {
    fn from(error: &ClientError) -> Self {
        let message = match error {
            ClientError::Contract(error) => error.kind().description().to_owned(),
            error => error.to_string(),
        };

        Notification::new(Level::Error, message)
    }
}
