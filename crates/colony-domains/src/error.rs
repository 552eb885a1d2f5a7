use colony_types::DomainId;
use thiserror::Error;

/// Errors from the domain tree and creation policies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain not found: {0}")]
    NotFound(DomainId),

    #[error("parent domain {0} is not the root domain")]
    ParentNotRoot(DomainId),

    #[error("creating a domain under {parent} would exceed max depth {max_depth}")]
    MaxDepthExceeded { parent: DomainId, max_depth: u32 },
}
