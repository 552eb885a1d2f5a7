//! # colony-tasks
//!
//! Task records and the signed role transfer protocol.
//!
//! A task role (manager, evaluator, worker) changes hands only when the
//! parties involved have signed the same payload. The payload binds the
//! colony, the task, the change being made and the task's current change
//! nonce, so an applied change can never be replayed.
//!
//! A transfer moves through `Proposed -> Verified -> Applied`, or ends in
//! `Rejected`. Verification is pure; the registry mutates only a verified
//! transfer.

pub mod assignment;
pub mod error;
pub mod protocol;
pub mod signature;
pub mod task;

pub use assignment::{AssignmentPayload, RoleAssignmentArgs, RoleAssignmentFunction};
pub use error::TaskError;
pub use protocol::{required_signers, verify_assignment, RoleTransfer, TransferState};
pub use signature::{Ed25519Verifier, SignatureMode, SignatureVerifier, SignedApproval};
pub use task::{Task, TaskRegistry, TaskRoleChange};
