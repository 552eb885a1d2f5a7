use colony_authority::AuthError;
use colony_domains::DomainError;
use colony_funding::FundingError;
use colony_roles::RoleError;
use colony_tasks::TaskError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collaborators::TransferFailure;
use crate::config::ConfigError;

/// Top-level error for every colony entry point.
#[derive(Error, Debug)]
pub enum ColonyError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("funding error: {0}")]
    Funding(#[from] FundingError),

    #[error("role error: {0}")]
    Role(#[from] RoleError),

    #[error("authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("task error: {0}")]
    Task(#[from] TaskError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("token transfer failed: {0}")]
    TransferFailed(#[from] TransferFailure),

    #[error("role assignment execution failed: {0}")]
    RoleAssignmentExecutionFailed(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("colony lock poisoned")]
    LockPoisoned,
}

/// Stable, machine-matchable failure reasons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Unauthorized,
    OnlyAuthorizedInChildDomain,
    ParentNotRoot,
    MaxDepthExceeded,
    InvalidPath,
    InsufficientBalance,
    RewardsPotLocked,
    RoleAssignmentExecutionFailed,
    SignatureRejected,
    ReplayedPayload,
    TransferFailed,
    InvalidParameter,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::OnlyAuthorizedInChildDomain => "only-authorized-in-child-domain",
            ErrorKind::ParentNotRoot => "parent-not-root",
            ErrorKind::MaxDepthExceeded => "max-depth-exceeded",
            ErrorKind::InvalidPath => "invalid-path",
            ErrorKind::InsufficientBalance => "insufficient-balance",
            ErrorKind::RewardsPotLocked => "rewards-pot-locked",
            ErrorKind::RoleAssignmentExecutionFailed => "role-assignment-execution-failed",
            ErrorKind::SignatureRejected => "signature-rejected",
            ErrorKind::ReplayedPayload => "replayed-payload",
            ErrorKind::TransferFailed => "transfer-failed",
            ErrorKind::InvalidParameter => "invalid-parameter",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ColonyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ColonyError::Domain(e) => match e {
                DomainError::NotFound(_) => ErrorKind::NotFound,
                DomainError::ParentNotRoot(_) => ErrorKind::ParentNotRoot,
                DomainError::MaxDepthExceeded { .. } => ErrorKind::MaxDepthExceeded,
            },
            ColonyError::Funding(e) => match e {
                FundingError::PotNotFound(_) => ErrorKind::NotFound,
                FundingError::RewardsPotLocked => ErrorKind::RewardsPotLocked,
                FundingError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
                FundingError::SamePot(_) | FundingError::Overflow { .. } => {
                    ErrorKind::InvalidParameter
                }
            },
            ColonyError::Role(_) => ErrorKind::InvalidParameter,
            ColonyError::Auth(e) => match e {
                AuthError::NotFound(_) => ErrorKind::NotFound,
                AuthError::InvalidPath { .. } => ErrorKind::InvalidPath,
                AuthError::Unauthorized { .. } => ErrorKind::Unauthorized,
                AuthError::OnlyAuthorizedInChildDomain { .. } => {
                    ErrorKind::OnlyAuthorizedInChildDomain
                }
            },
            ColonyError::Task(e) => match e {
                TaskError::NotFound(_) => ErrorKind::NotFound,
                TaskError::SignatureRejected(_) => ErrorKind::SignatureRejected,
                TaskError::ReplayedPayload { .. } => ErrorKind::ReplayedPayload,
                TaskError::RoleAssignmentExecutionFailed(_) => {
                    ErrorKind::RoleAssignmentExecutionFailed
                }
                TaskError::InvalidParameter(_) => ErrorKind::InvalidParameter,
                TaskError::NotVerified(_) | TaskError::Encoding(_) => ErrorKind::Internal,
            },
            ColonyError::Config(_) => ErrorKind::InvalidParameter,
            ColonyError::TransferFailed(_) => ErrorKind::TransferFailed,
            ColonyError::RoleAssignmentExecutionFailed(_) => {
                ErrorKind::RoleAssignmentExecutionFailed
            }
            ColonyError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ColonyError::LockPoisoned => ErrorKind::Internal,
        }
    }

    /// Shorthand for `self.kind().as_str()`.
    pub fn reason(&self) -> &'static str {
        self.kind().as_str()
    }
}
