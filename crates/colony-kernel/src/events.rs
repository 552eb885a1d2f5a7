use chrono::{DateTime, Utc};
use colony_types::{ActorId, Amount, DomainId, FundingPotId, Role, TaskId, TokenId};
use colony_tasks::{RoleAssignmentFunction, TaskRoleChange};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique event identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evt:{}", self.0)
    }
}

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ColonyEventKind {
    ColonyCreated {
        name: String,
        founder: ActorId,
        token: TokenId,
    },
    RoleSet {
        by: ActorId,
        user: ActorId,
        domain: DomainId,
        role: Role,
        enabled: bool,
    },
    DomainAdded {
        domain: DomainId,
        parent: DomainId,
        funding_pot: FundingPotId,
    },
    FundsMoved {
        by: ActorId,
        from: FundingPotId,
        to: FundingPotId,
        token: TokenId,
        amount: Amount,
    },
    ColonyFunded {
        from: ActorId,
        token: TokenId,
        amount: Amount,
        reward_fee: Amount,
    },
    RewardInverseSet {
        reward_inverse: u64,
    },
    TaskAdded {
        task: TaskId,
        domain: DomainId,
        funding_pot: FundingPotId,
    },
    TaskRoleAssigned {
        selector: RoleAssignmentFunction,
        change: TaskRoleChange,
    },
    TaskRoleAssignmentRejected {
        task: TaskId,
        selector: RoleAssignmentFunction,
        reason: String,
    },
}

impl ColonyEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColonyEventKind::ColonyCreated { .. } => "colony-created",
            ColonyEventKind::RoleSet { .. } => "role-set",
            ColonyEventKind::DomainAdded { .. } => "domain-added",
            ColonyEventKind::FundsMoved { .. } => "funds-moved",
            ColonyEventKind::ColonyFunded { .. } => "colony-funded",
            ColonyEventKind::RewardInverseSet { .. } => "reward-inverse-set",
            ColonyEventKind::TaskAdded { .. } => "task-added",
            ColonyEventKind::TaskRoleAssigned { .. } => "task-role-assigned",
            ColonyEventKind::TaskRoleAssignmentRejected { .. } => "task-role-assignment-rejected",
        }
    }
}

/// A colony event as handed to the event sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColonyEvent {
    pub id: EventId,
    pub colony: String,
    pub at: DateTime<Utc>,
    pub kind: ColonyEventKind,
}

impl ColonyEvent {
    pub fn new(colony: impl Into<String>, kind: ColonyEventKind) -> Self {
        Self {
            id: EventId::new(),
            colony: colony.into(),
            at: Utc::now(),
            kind,
        }
    }
}
