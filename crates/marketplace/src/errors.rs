//! Contract error codes.
//!
//! Each marketplace contract reports failures as a numeric code. Codes are only meaningful
//! together with the contract that produced them, so [`ContractError`] keeps both.

use std::fmt::{self, Display, Formatter};

use derive_more::Display;

/// Marketplace contract that produced a result.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// Contract registry.
    #[display(fmt = "registry")]
    Registry,

    /// Deployment manager.
    #[display(fmt = "deployment manager")]
    DeploymentManager,

    /// Review system.
    #[display(fmt = "review system")]
    ReviewSystem,
}

/// Contract registry error codes.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum RegistryError {
    ContractAlreadyExists,
    ContractNotFound,
    UnauthorizedUpdate,
    InvalidMetadata,
    InvalidWasmHash,
    UnauthorizedVerification,
}

/// Deployment manager error codes.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum DeploymentManagerError {
    ContractNotFound,
    DeploymentFailed,
    InvalidParameters,
    InvalidWasmHash,
    UnauthorizedAccess,
}

/// Review system error codes.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum ReviewError {
    InvalidRating,
    AlreadyReviewed,
    ReviewNotFound,
    EmptyComment,
    CommentTooLong,
    UnauthorizedAction,
    AlreadyVoted,
    CannotReviewOwnContract,
}

impl RegistryError {
    fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => RegistryError::ContractAlreadyExists,
            2 => RegistryError::ContractNotFound,
            3 => RegistryError::UnauthorizedUpdate,
            4 => RegistryError::InvalidMetadata,
            5 => RegistryError::InvalidWasmHash,
            6 => RegistryError::UnauthorizedVerification,
            _ => return None,
        })
    }
}

impl DeploymentManagerError {
    fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => DeploymentManagerError::ContractNotFound,
            2 => DeploymentManagerError::DeploymentFailed,
            3 => DeploymentManagerError::InvalidParameters,
            4 => DeploymentManagerError::InvalidWasmHash,
            5 => DeploymentManagerError::UnauthorizedAccess,
            _ => return None,
        })
    }
}

impl ReviewError {
    fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => ReviewError::InvalidRating,
            2 => ReviewError::AlreadyReviewed,
            3 => ReviewError::ReviewNotFound,
            4 => ReviewError::EmptyComment,
            5 => ReviewError::CommentTooLong,
            6 => ReviewError::UnauthorizedAction,
            7 => ReviewError::AlreadyVoted,
            8 => ReviewError::CannotReviewOwnContract,
            _ => return None,
        })
    }
}

/// Named contract error category.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContractErrorKind {
    Registry(RegistryError),
    DeploymentManager(DeploymentManagerError),
    ReviewSystem(ReviewError),

    /// Code is not known for the contract that produced it.
    Unknown,
}

impl ContractErrorKind {
    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ContractErrorKind::Registry(error) => match error {
                RegistryError::ContractAlreadyExists => "the contract is already published",
                RegistryError::ContractNotFound => "the contract does not exist in the registry",
                RegistryError::UnauthorizedUpdate => "only the contract author can update it",
                RegistryError::InvalidMetadata => "the contract metadata is invalid",
                RegistryError::InvalidWasmHash => "the WASM hash is invalid",
                RegistryError::UnauthorizedVerification => {
                    "you are not allowed to verify contracts"
                }
            },
            ContractErrorKind::DeploymentManager(error) => match error {
                DeploymentManagerError::ContractNotFound => "the deployment does not exist",
                DeploymentManagerError::DeploymentFailed => {
                    "the contract instance could not be deployed"
                }
                DeploymentManagerError::InvalidParameters => "the deployment parameters are invalid",
                DeploymentManagerError::InvalidWasmHash => "the WASM hash is invalid",
                DeploymentManagerError::UnauthorizedAccess => {
                    "you are not allowed to perform this deployment"
                }
            },
            ContractErrorKind::ReviewSystem(error) => match error {
                ReviewError::InvalidRating => "the rating must be between 1 and 5",
                ReviewError::AlreadyReviewed => "you have already reviewed this contract",
                ReviewError::ReviewNotFound => "the review does not exist",
                ReviewError::EmptyComment => "the review comment is empty",
                ReviewError::CommentTooLong => "the review comment must be 500 characters or less",
                ReviewError::UnauthorizedAction => "you are not allowed to perform this action",
                ReviewError::AlreadyVoted => "you have already upvoted this review",
                ReviewError::CannotReviewOwnContract => "you cannot review your own contract",
            },
            ContractErrorKind::Unknown => "the contract returned an unknown error",
        }
    }
}

impl Display for ContractErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ContractErrorKind::Registry(error) => error.fmt(f),
            ContractErrorKind::DeploymentManager(error) => error.fmt(f),
            ContractErrorKind::ReviewSystem(error) => error.fmt(f),
            ContractErrorKind::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Error code returned by one of the marketplace contracts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContractError {
    /// Contract that returned the error.
    pub contract: ContractKind,

    /// Raw error code.
    pub code: u32,
}

impl ContractError {
    /// Create new contract error.
    pub fn new(contract: ContractKind, code: u32) -> Self {
        Self { contract, code }
    }

    /// Map the raw error code to its named category.
    pub fn kind(&self) -> ContractErrorKind {
        match self.contract {
            ContractKind::Registry => {
                RegistryError::from_code(self.code).map(ContractErrorKind::Registry)
            }
            ContractKind::DeploymentManager => DeploymentManagerError::from_code(self.code)
                .map(ContractErrorKind::DeploymentManager),
            ContractKind::ReviewSystem => {
                ReviewError::from_code(self.code).map(ContractErrorKind::ReviewSystem)
            }
        }
        .unwrap_or(ContractErrorKind::Unknown)
    }
}

impl Display for ContractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = self.kind();

        write!(
            f,
            "{kind} ({} error #{}): {}",
            self.contract,
            self.code,
            kind.description()
        )
    }
}

impl std::error::Error for ContractError {}

/// Extract contract error code from a host error message.
///
/// Soroban hosts report contract errors as `Error(Contract, #<code>)`.
pub fn parse_host_error_code(message: &str) -> Option<u32> {
    const MARKER: &str = "Error(Contract, #";

    let start = message.find(MARKER)? + MARKER.len();
    let rest = &message[start..];
    let end = rest.find(')')?;

    rest[..end].trim().parse().ok()
}
