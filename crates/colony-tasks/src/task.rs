use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use colony_types::{ActorId, DomainId, FundingPotId, TaskId, TaskRole};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assignment::RoleAssignmentFunction;
use crate::error::TaskError;
use crate::protocol::{RoleTransfer, TransferState};

/// A task record: the parts role transfer and task funding need.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub domain: DomainId,
    pub funding_pot: FundingPotId,
    #[serde(with = "hex::serde")]
    pub specification_hash: [u8; 32],
    pub due_date: Option<DateTime<Utc>>,
    roles: BTreeMap<TaskRole, ActorId>,
    /// Incremented on every applied signed change.
    pub change_nonce: u64,
}

impl Task {
    pub fn holder(&self, role: TaskRole) -> Option<ActorId> {
        self.roles.get(&role).copied()
    }

    /// The manager is assigned at creation and can only be replaced.
    pub fn manager(&self) -> Option<ActorId> {
        self.holder(TaskRole::Manager)
    }

    pub fn roles(&self) -> &BTreeMap<TaskRole, ActorId> {
        &self.roles
    }
}

/// The effect of an applied transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRoleChange {
    pub task: TaskId,
    pub role: TaskRole,
    pub previous: Option<ActorId>,
    pub current: Option<ActorId>,
    pub nonce: u64,
}

/// Owns every task of a colony.
pub struct TaskRegistry {
    tasks: BTreeMap<TaskId, Task>,
    next_id: u64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a task. The creator becomes both manager and evaluator.
    pub fn create(
        &mut self,
        creator: ActorId,
        domain: DomainId,
        funding_pot: FundingPotId,
        specification_hash: [u8; 32],
        due_date: Option<DateTime<Utc>>,
    ) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let mut roles = BTreeMap::new();
        roles.insert(TaskRole::Manager, creator);
        roles.insert(TaskRole::Evaluator, creator);

        self.tasks.insert(
            id,
            Task {
                id,
                domain,
                funding_pot,
                specification_hash,
                due_date,
                roles,
                change_nonce: 0,
            },
        );

        info!(task = %id, domain = %domain, pot = %funding_pot, manager = %creator, "Task created");
        id
    }

    /// The id the next created task will receive.
    pub fn next_id(&self) -> TaskId {
        TaskId(self.next_id)
    }

    pub fn get(&self, id: TaskId) -> Result<&Task, TaskError> {
        self.tasks.get(&id).ok_or(TaskError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Check the execution preconditions of a verified transfer.
    pub fn check_apply(&self, transfer: &RoleTransfer) -> Result<(), TaskError> {
        if transfer.state() != &TransferState::Verified {
            return Err(TaskError::NotVerified(transfer.state().to_string()));
        }
        let payload = transfer.payload();
        let task = self.get(payload.task_id)?;
        if task.change_nonce != payload.nonce {
            return Err(TaskError::ReplayedPayload {
                task: task.id,
                expected: task.change_nonce,
                got: payload.nonce,
            });
        }

        let role = payload.selector.role();
        let holder = task.holder(role);
        match payload.selector {
            RoleAssignmentFunction::SetTaskManagerRole => Ok(()),
            RoleAssignmentFunction::SetTaskEvaluatorRole
            | RoleAssignmentFunction::SetTaskWorkerRole => match holder {
                Some(current) => Err(TaskError::RoleAssignmentExecutionFailed(format!(
                    "task {} already has {role} {current}",
                    task.id
                ))),
                None => Ok(()),
            },
            RoleAssignmentFunction::RemoveTaskEvaluatorRole
            | RoleAssignmentFunction::RemoveTaskWorkerRole => match holder {
                Some(_) => Ok(()),
                None => Err(TaskError::RoleAssignmentExecutionFailed(format!(
                    "task {} has no {role} to remove",
                    task.id
                ))),
            },
        }
    }

    /// Apply a verified transfer and bump the task's change nonce.
    pub fn apply(&mut self, transfer: &mut RoleTransfer) -> Result<TaskRoleChange, TaskError> {
        self.check_apply(transfer)?;

        let payload = transfer.payload().clone();
        let task = self
            .tasks
            .get_mut(&payload.task_id)
            .ok_or(TaskError::NotFound(payload.task_id))?;

        let role = payload.selector.role();
        let previous = task.holder(role);
        let current = if payload.selector.is_removal() {
            task.roles.remove(&role);
            None
        } else {
            let user = payload.args.user.ok_or_else(|| {
                TaskError::InvalidParameter(format!("{} needs a user", payload.selector))
            })?;
            task.roles.insert(role, user);
            Some(user)
        };
        task.change_nonce += 1;
        transfer.mark_applied();

        info!(
            task = %task.id,
            role = %role,
            previous = ?previous,
            current = ?current,
            nonce = task.change_nonce,
            "Task role changed"
        );

        Ok(TaskRoleChange {
            task: task.id,
            role,
            previous,
            current,
            nonce: task.change_nonce,
        })
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
