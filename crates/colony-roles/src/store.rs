use std::collections::HashMap;

use colony_types::{ActorId, DomainId, Role, RoleSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RoleError;

/// One `(actor, domain)` row of the store, used for snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub actor: ActorId,
    pub domain: DomainId,
    pub roles: RoleSet,
}

/// Stored role bits of every actor in every domain.
///
/// Rows are created implicitly empty and toggled off rather than deleted, so
/// a revoked grant leaves an empty row behind.
pub struct RoleStore {
    entries: HashMap<(ActorId, DomainId), RoleSet>,
}

impl RoleStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Pure stored-bit lookup.
    pub fn has_role(&self, actor: &ActorId, domain: DomainId, role: Role) -> bool {
        self.roles(actor, domain).contains(role)
    }

    /// Every stored role of `actor` in `domain`.
    pub fn roles(&self, actor: &ActorId, domain: DomainId) -> RoleSet {
        self.entries
            .get(&(*actor, domain))
            .copied()
            .unwrap_or_default()
    }

    /// Set or clear one role bit.
    ///
    /// Returns whether the stored bit changed. ArchitectureSubdomain is never
    /// stored, and Root and Recovery are only stored at the root domain.
    pub fn set_role(
        &mut self,
        actor: &ActorId,
        domain: DomainId,
        role: Role,
        enabled: bool,
    ) -> Result<bool, RoleError> {
        if role == Role::ArchitectureSubdomain {
            return Err(RoleError::DerivedRole(role));
        }
        if role.is_root_scoped() && !domain.is_root() {
            return Err(RoleError::RootScoped { role, domain });
        }

        let set = self.entries.entry((*actor, domain)).or_default();
        let before = *set;
        set.set(role, enabled);
        let changed = before != *set;

        if changed {
            info!(
                actor = %actor,
                domain = %domain,
                role = %role,
                enabled,
                "Role updated"
            );
        } else {
            debug!(actor = %actor, domain = %domain, role = %role, enabled, "Role unchanged");
        }
        Ok(changed)
    }

    /// Actors storing `role` in `domain`, in actor order.
    pub fn holders(&self, domain: DomainId, role: Role) -> Vec<ActorId> {
        let mut out: Vec<ActorId> = self
            .entries
            .iter()
            .filter(|((_, d), set)| *d == domain && set.contains(role))
            .map(|((actor, _), _)| *actor)
            .collect();
        out.sort();
        out
    }

    /// All rows, including empty ones, ordered by domain then actor.
    pub fn snapshot(&self) -> Vec<RoleEntry> {
        let mut rows: Vec<RoleEntry> = self
            .entries
            .iter()
            .map(|((actor, domain), roles)| RoleEntry {
                actor: *actor,
                domain: *domain,
                roles: *roles,
            })
            .collect();
        rows.sort_by(|a, b| (a.domain, a.actor).cmp(&(b.domain, b.actor)));
        rows
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RoleStore {
    fn default() -> Self {
        Self::new()
    }
}
