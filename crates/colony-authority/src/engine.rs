use colony_domains::DomainTree;
use colony_roles::RoleStore;
use colony_types::{ActorId, DomainId, Role, RoleSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::Action;
use crate::error::AuthError;

/// Where a caller claims authority: a permission domain plus the index of the
/// target inside that domain's descendant list.
///
/// The index is ignored when the target is the permission domain itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub permission_domain: DomainId,
    pub child_skill_index: usize,
}

impl Scope {
    pub fn new(permission_domain: DomainId, child_skill_index: usize) -> Self {
        Self {
            permission_domain,
            child_skill_index,
        }
    }

    /// Authority claimed in `domain` for `domain` itself.
    pub fn at(domain: DomainId) -> Self {
        Self::new(domain, 0)
    }

    pub fn root() -> Self {
        Self::at(DomainId::ROOT)
    }
}

/// How an authorization was granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", content = "role", rename_all = "kebab-case")]
pub enum Grant {
    /// Root held at the root domain.
    RootOverride,
    /// A direct role held at the permission domain.
    Direct(Role),
    /// Architecture at the permission domain, exercised in a direct child.
    Subdomain,
}

/// A successful authorization decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub actor: ActorId,
    pub action: Action,
    pub permission_domain: DomainId,
    pub target: DomainId,
    pub grant: Grant,
}

/// Read-only authorization decisions over the domain tree and the
/// stored role bits.
pub struct AuthorizationEngine<'a> {
    domains: &'a DomainTree,
    roles: &'a RoleStore,
}

impl<'a> AuthorizationEngine<'a> {
    pub fn new(domains: &'a DomainTree, roles: &'a RoleStore) -> Self {
        Self { domains, roles }
    }

    /// Role lookup with inheritance applied.
    ///
    /// ArchitectureSubdomain is held in a domain when Architecture is stored
    /// there or at its parent. Every other role is the stored bit.
    pub fn has_user_role(&self, actor: &ActorId, domain: DomainId, role: Role) -> bool {
        if role != Role::ArchitectureSubdomain {
            return self.roles.has_role(actor, domain, role);
        }
        if self.roles.has_role(actor, domain, Role::Architecture) {
            return true;
        }
        self.domains
            .parent_of(domain)
            .is_some_and(|parent| self.roles.has_role(actor, parent, Role::Architecture))
    }

    /// Every role `has_user_role` reports for `actor` in `domain`.
    pub fn effective_roles(&self, actor: &ActorId, domain: DomainId) -> RoleSet {
        Role::ALL
            .into_iter()
            .filter(|role| self.has_user_role(actor, domain, *role))
            .collect()
    }

    /// Check that `scope` leads to `target`.
    ///
    /// Returns how many levels the target sits below the permission domain.
    pub fn resolve_target(&self, scope: Scope, target: DomainId) -> Result<u32, AuthError> {
        let permission_domain = scope.permission_domain;
        if !self.domains.contains(permission_domain) {
            return Err(AuthError::NotFound(permission_domain));
        }
        if !self.domains.contains(target) {
            return Err(AuthError::NotFound(target));
        }
        if target == permission_domain {
            return Ok(0);
        }

        let invalid = AuthError::InvalidPath {
            permission_domain,
            child_skill_index: scope.child_skill_index,
            target,
        };
        if self
            .domains
            .descendant_at(permission_domain, scope.child_skill_index)
            != Some(target)
        {
            return Err(invalid);
        }
        self.domains
            .depth_below(permission_domain, target)
            .ok_or(invalid)
    }

    /// Decide whether `actor` may take `action` in `target`, claiming
    /// authority through `scope`.
    pub fn authorize(
        &self,
        actor: &ActorId,
        scope: Scope,
        target: DomainId,
        action: Action,
    ) -> Result<Authorization, AuthError> {
        let depth = self.resolve_target(scope, target)?;
        let permission_domain = scope.permission_domain;

        let granted = |grant| {
            debug!(
                actor = %actor,
                action = %action,
                permission_domain = %permission_domain,
                target = %target,
                grant = ?grant,
                "Authorized"
            );
            Ok(Authorization {
                actor: *actor,
                action,
                permission_domain,
                target,
                grant,
            })
        };

        if self.roles.has_role(actor, DomainId::ROOT, Role::Root) {
            return granted(Grant::RootOverride);
        }

        if action.is_root_only() {
            warn!(
                actor = %actor,
                action = %action,
                target = %target,
                "Root-only action without root"
            );
            return Err(AuthError::Unauthorized {
                actor: *actor,
                action,
                domain: target,
            });
        }

        if let Some(role) = action
            .direct_roles()
            .iter()
            .find(|role| self.roles.has_role(actor, permission_domain, *role))
        {
            return granted(Grant::Direct(role));
        }

        // Only Architecture stored at the permission domain counts here; the
        // subdomain authority a domain inherits from its parent is not
        // delegated further down.
        if !action.subdomain_roles().is_empty()
            && self
                .roles
                .has_role(actor, permission_domain, Role::Architecture)
        {
            if depth == 1 {
                return granted(Grant::Subdomain);
            }
            warn!(
                actor = %actor,
                action = %action,
                permission_domain = %permission_domain,
                target = %target,
                "Subdomain authority used outside a direct child"
            );
            return Err(AuthError::OnlyAuthorizedInChildDomain {
                actor: *actor,
                action,
                permission_domain,
                target,
            });
        }

        warn!(
            actor = %actor,
            action = %action,
            permission_domain = %permission_domain,
            target = %target,
            "Unauthorized"
        );
        Err(AuthError::Unauthorized {
            actor: *actor,
            action,
            domain: target,
        })
    }

    /// Authorize a move between the pots of two domains.
    ///
    /// Both ends must be reachable from the permission domain; the caller
    /// needs Funding there (or Root).
    pub fn authorize_move(
        &self,
        actor: &ActorId,
        permission_domain: DomainId,
        from: (usize, DomainId),
        to: (usize, DomainId),
    ) -> Result<Authorization, AuthError> {
        let (from_index, from_domain) = from;
        let (to_index, to_domain) = to;
        self.resolve_target(Scope::new(permission_domain, to_index), to_domain)?;
        self.authorize(
            actor,
            Scope::new(permission_domain, from_index),
            from_domain,
            Action::MoveFunds,
        )
    }
}
