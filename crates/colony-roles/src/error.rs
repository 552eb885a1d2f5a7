use colony_types::{DomainId, Role};
use thiserror::Error;

/// Writes the role store refuses regardless of who asks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("role {0} is derived and cannot be stored")]
    DerivedRole(Role),

    #[error("role {role} can only be held at the root domain, not {domain}")]
    RootScoped { role: Role, domain: DomainId },
}
