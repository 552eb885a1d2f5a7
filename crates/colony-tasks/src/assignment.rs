use colony_types::{ActorId, DomainId, TaskId, TaskRole};
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Task role changes that need signed approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleAssignmentFunction {
    SetTaskManagerRole,
    SetTaskEvaluatorRole,
    SetTaskWorkerRole,
    RemoveTaskEvaluatorRole,
    RemoveTaskWorkerRole,
}

impl RoleAssignmentFunction {
    pub const ALL: [RoleAssignmentFunction; 5] = [
        RoleAssignmentFunction::SetTaskManagerRole,
        RoleAssignmentFunction::SetTaskEvaluatorRole,
        RoleAssignmentFunction::SetTaskWorkerRole,
        RoleAssignmentFunction::RemoveTaskEvaluatorRole,
        RoleAssignmentFunction::RemoveTaskWorkerRole,
    ];

    /// The task role this function changes.
    pub fn role(self) -> TaskRole {
        match self {
            RoleAssignmentFunction::SetTaskManagerRole => TaskRole::Manager,
            RoleAssignmentFunction::SetTaskEvaluatorRole
            | RoleAssignmentFunction::RemoveTaskEvaluatorRole => TaskRole::Evaluator,
            RoleAssignmentFunction::SetTaskWorkerRole
            | RoleAssignmentFunction::RemoveTaskWorkerRole => TaskRole::Worker,
        }
    }

    pub fn is_removal(self) -> bool {
        matches!(
            self,
            RoleAssignmentFunction::RemoveTaskEvaluatorRole
                | RoleAssignmentFunction::RemoveTaskWorkerRole
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoleAssignmentFunction::SetTaskManagerRole => "set-task-manager-role",
            RoleAssignmentFunction::SetTaskEvaluatorRole => "set-task-evaluator-role",
            RoleAssignmentFunction::SetTaskWorkerRole => "set-task-worker-role",
            RoleAssignmentFunction::RemoveTaskEvaluatorRole => "remove-task-evaluator-role",
            RoleAssignmentFunction::RemoveTaskWorkerRole => "remove-task-worker-role",
        }
    }
}

impl std::fmt::Display for RoleAssignmentFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleAssignmentFunction {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| TaskError::InvalidParameter(format!("unknown role assignment function: {s}")))
    }
}

/// Arguments of a role assignment call.
///
/// `permission_domain` and `child_skill_index` locate the task's domain from
/// the domain where the incoming manager holds Administration. They are only
/// consulted for manager changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignmentArgs {
    pub task_id: TaskId,
    pub user: Option<ActorId>,
    pub permission_domain: DomainId,
    pub child_skill_index: usize,
}

impl RoleAssignmentArgs {
    pub fn assign(
        task_id: TaskId,
        user: ActorId,
        permission_domain: DomainId,
        child_skill_index: usize,
    ) -> Self {
        Self {
            task_id,
            user: Some(user),
            permission_domain,
            child_skill_index,
        }
    }

    pub fn remove(task_id: TaskId, permission_domain: DomainId) -> Self {
        Self {
            task_id,
            user: None,
            permission_domain,
            child_skill_index: 0,
        }
    }
}

/// The message every party of a transfer signs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPayload {
    pub colony: String,
    pub task_id: TaskId,
    pub selector: RoleAssignmentFunction,
    pub args: RoleAssignmentArgs,
    pub nonce: u64,
}

impl AssignmentPayload {
    pub fn new(
        colony: impl Into<String>,
        selector: RoleAssignmentFunction,
        args: RoleAssignmentArgs,
        nonce: u64,
    ) -> Self {
        Self {
            colony: colony.into(),
            task_id: args.task_id,
            selector,
            args,
            nonce,
        }
    }

    /// BLAKE3 over the canonical JSON encoding.
    pub fn digest(&self) -> Result<[u8; 32], TaskError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| TaskError::Encoding(e.to_string()))?;
        Ok(*blake3::hash(&bytes).as_bytes())
    }

    /// Shape checks that need no task state.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.args.task_id != self.task_id {
            return Err(TaskError::InvalidParameter(format!(
                "payload names {} but args name {}",
                self.task_id, self.args.task_id
            )));
        }
        match (self.selector.is_removal(), self.args.user) {
            (false, None) => Err(TaskError::InvalidParameter(format!(
                "{} needs a user",
                self.selector
            ))),
            (true, Some(_)) => Err(TaskError::InvalidParameter(format!(
                "{} takes no user",
                self.selector
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(nonce: u64) -> AssignmentPayload {
        AssignmentPayload::new(
            "meta",
            RoleAssignmentFunction::SetTaskWorkerRole,
            RoleAssignmentArgs::assign(TaskId(1), ActorId::from_label("worker"), DomainId(2), 0),
            nonce,
        )
    }

    #[test]
    fn digest_binds_the_nonce() {
        assert_eq!(payload(0).digest().unwrap(), payload(0).digest().unwrap());
        assert_ne!(payload(0).digest().unwrap(), payload(1).digest().unwrap());
    }

    #[test]
    fn digest_hashes_the_json_encoding() {
        let payload = payload(3);
        let bytes = serde_json::to_vec(&payload).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(payload.digest().unwrap(), *blake3::hash(&bytes).as_bytes());
        assert_ne!(payload.digest().unwrap(), *blake3::hash(&[]).as_bytes());
    }

    #[test]
    fn digest_binds_the_colony_and_selector() {
        let mut other_colony = payload(0);
        other_colony.colony = "other".into();
        assert_ne!(payload(0).digest().unwrap(), other_colony.digest().unwrap());

        let mut other_selector = payload(0);
        other_selector.selector = RoleAssignmentFunction::SetTaskEvaluatorRole;
        assert_ne!(payload(0).digest().unwrap(), other_selector.digest().unwrap());
    }

    #[test]
    fn selectors_map_to_roles() {
        assert_eq!(RoleAssignmentFunction::SetTaskManagerRole.role(), TaskRole::Manager);
        assert_eq!(RoleAssignmentFunction::RemoveTaskWorkerRole.role(), TaskRole::Worker);
        assert!(RoleAssignmentFunction::RemoveTaskEvaluatorRole.is_removal());
        assert!(!RoleAssignmentFunction::SetTaskEvaluatorRole.is_removal());
        assert_eq!(
            "remove-task-worker-role".parse::<RoleAssignmentFunction>().unwrap(),
            RoleAssignmentFunction::RemoveTaskWorkerRole
        );
        assert!("transfer".parse::<RoleAssignmentFunction>().is_err());
    }

    #[test]
    fn validate_checks_user_presence() {
        assert!(payload(0).validate().is_ok());

        let mut missing_user = payload(0);
        missing_user.args.user = None;
        assert!(matches!(missing_user.validate(), Err(TaskError::InvalidParameter(_))));

        let removal = AssignmentPayload::new(
            "meta",
            RoleAssignmentFunction::RemoveTaskWorkerRole,
            RoleAssignmentArgs::remove(TaskId(1), DomainId(2)),
            0,
        );
        assert!(removal.validate().is_ok());
    }

    #[test]
    fn validate_checks_task_id_agreement() {
        let mut p = payload(0);
        p.task_id = TaskId(9);
        assert!(matches!(p.validate(), Err(TaskError::InvalidParameter(_))));
    }
}
