use colony_types::TaskId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the task registry and the role transfer protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("signature rejected: {0}")]
    SignatureRejected(String),

    #[error("payload for {task} carries nonce {got}, current nonce is {expected}")]
    ReplayedPayload { task: TaskId, expected: u64, got: u64 },

    #[error("role assignment execution failed: {0}")]
    RoleAssignmentExecutionFailed(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("transfer is {0}, expected it to be verified")]
    NotVerified(String),

    #[error("payload encoding failed: {0}")]
    Encoding(String),
}
