use colony_types::{ActorId, DomainId};
use thiserror::Error;

use crate::action::Action;

/// Authorization denials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("domain not found: {0}")]
    NotFound(DomainId),

    #[error("child skill index {child_skill_index} below {permission_domain} does not lead to {target}")]
    InvalidPath {
        permission_domain: DomainId,
        child_skill_index: usize,
        target: DomainId,
    },

    #[error("{actor} is not authorized to {action} in {domain}")]
    Unauthorized {
        actor: ActorId,
        action: Action,
        domain: DomainId,
    },

    #[error("{actor} may only {action} in direct children of {permission_domain}, not {target}")]
    OnlyAuthorizedInChildDomain {
        actor: ActorId,
        action: Action,
        permission_domain: DomainId,
        target: DomainId,
    },
}
