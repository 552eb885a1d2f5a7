use colony_types::{Role, RoleSet};
use serde::{Deserialize, Serialize};

/// Privileged actions guarded by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    AddDomain,
    SetRootRole,
    SetRecoveryRole,
    SetRewardInverse,
    SetArchitectureRole,
    SetFundingRole,
    SetAdministrationRole,
    SetArbitrationRole,
    MoveFunds,
    MakeTask,
    HoldTaskManager,
}

impl Action {
    /// Roles that authorize this action when held at the permission domain.
    ///
    /// Root is not listed: its override is applied separately and only counts
    /// when held at the root domain.
    pub fn direct_roles(self) -> RoleSet {
        match self {
            Action::AddDomain => RoleSet::empty().with(Role::Architecture),
            Action::MoveFunds => RoleSet::empty().with(Role::Funding),
            Action::MakeTask | Action::HoldTaskManager => {
                RoleSet::empty().with(Role::Administration)
            }
            Action::SetRootRole
            | Action::SetRecoveryRole
            | Action::SetRewardInverse
            | Action::SetArchitectureRole
            | Action::SetFundingRole
            | Action::SetAdministrationRole
            | Action::SetArbitrationRole => RoleSet::empty(),
        }
    }

    /// Roles that authorize this action one level below the permission domain.
    pub fn subdomain_roles(self) -> RoleSet {
        if self.is_role_setter() {
            RoleSet::empty().with(Role::ArchitectureSubdomain)
        } else {
            RoleSet::empty()
        }
    }

    /// Actions only Root may take, always at the root domain.
    pub fn is_root_only(self) -> bool {
        matches!(
            self,
            Action::SetRootRole | Action::SetRecoveryRole | Action::SetRewardInverse
        )
    }

    fn is_role_setter(self) -> bool {
        matches!(
            self,
            Action::SetArchitectureRole
                | Action::SetFundingRole
                | Action::SetAdministrationRole
                | Action::SetArbitrationRole
        )
    }

    /// The setter action that grants or revokes `role`.
    pub fn setter_for(role: Role) -> Option<Action> {
        match role {
            Role::Root => Some(Action::SetRootRole),
            Role::Recovery => Some(Action::SetRecoveryRole),
            Role::Architecture => Some(Action::SetArchitectureRole),
            Role::Funding => Some(Action::SetFundingRole),
            Role::Administration => Some(Action::SetAdministrationRole),
            Role::Arbitration => Some(Action::SetArbitrationRole),
            Role::ArchitectureSubdomain => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::AddDomain => "add-domain",
            Action::SetRootRole => "set-root-role",
            Action::SetRecoveryRole => "set-recovery-role",
            Action::SetRewardInverse => "set-reward-inverse",
            Action::SetArchitectureRole => "set-architecture-role",
            Action::SetFundingRole => "set-funding-role",
            Action::SetAdministrationRole => "set-administration-role",
            Action::SetArbitrationRole => "set-arbitration-role",
            Action::MoveFunds => "move-funds",
            Action::MakeTask => "make-task",
            Action::HoldTaskManager => "hold-task-manager",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
