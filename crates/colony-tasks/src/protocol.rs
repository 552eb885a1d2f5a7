use std::collections::BTreeSet;

use colony_types::ActorId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assignment::AssignmentPayload;
use crate::error::TaskError;
use crate::signature::{SignatureVerifier, SignedApproval};
use crate::task::Task;

/// Lifecycle of a signed role transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "kebab-case")]
pub enum TransferState {
    Proposed,
    Verified,
    Applied,
    Rejected(TaskError),
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferState::Proposed => f.write_str("proposed"),
            TransferState::Verified => f.write_str("verified"),
            TransferState::Applied => f.write_str("applied"),
            TransferState::Rejected(_) => f.write_str("rejected"),
        }
    }
}

/// Parties that must sign a payload against the current task state.
///
/// The current manager always signs. The other party is the incoming holder
/// for a set, or the outgoing holder for a removal; when that is the manager
/// too, one signature is enough.
pub fn required_signers(task: &Task, payload: &AssignmentPayload) -> Result<Vec<ActorId>, TaskError> {
    let manager = task.manager().ok_or_else(|| {
        TaskError::RoleAssignmentExecutionFailed(format!("task {} has no manager", task.id))
    })?;

    let other = if payload.selector.is_removal() {
        task.holder(payload.selector.role()).unwrap_or(manager)
    } else {
        payload.args.user.ok_or_else(|| {
            TaskError::InvalidParameter(format!("{} needs a user", payload.selector))
        })?
    };

    if other == manager {
        Ok(vec![manager])
    } else {
        Ok(vec![manager, other])
    }
}

/// Check a payload and its approvals against the task. No state changes.
///
/// Returns the recovered signers in approval order.
pub fn verify_assignment(
    task: &Task,
    payload: &AssignmentPayload,
    approvals: &[SignedApproval],
    verifier: &dyn SignatureVerifier,
) -> Result<Vec<ActorId>, TaskError> {
    payload.validate()?;
    if payload.task_id != task.id {
        return Err(TaskError::InvalidParameter(format!(
            "payload names {} but was checked against {}",
            payload.task_id, task.id
        )));
    }
    if payload.nonce != task.change_nonce {
        return Err(TaskError::ReplayedPayload {
            task: task.id,
            expected: task.change_nonce,
            got: payload.nonce,
        });
    }

    let required = required_signers(task, payload)?;
    let digest = payload.digest()?;

    let mut signers = Vec::with_capacity(approvals.len());
    for (i, approval) in approvals.iter().enumerate() {
        let signer = verifier.verify(&digest, approval).ok_or_else(|| {
            TaskError::SignatureRejected(format!("approval {i} does not verify"))
        })?;
        signers.push(signer);
    }

    let distinct: BTreeSet<ActorId> = signers.iter().copied().collect();
    if distinct.len() != signers.len() {
        return Err(TaskError::SignatureRejected("duplicate signer".into()));
    }
    if signers.len() != required.len() {
        return Err(TaskError::SignatureRejected(format!(
            "expected {} signatures, got {}",
            required.len(),
            signers.len()
        )));
    }
    if let Some(missing) = required.iter().find(|actor| !distinct.contains(*actor)) {
        return Err(TaskError::SignatureRejected(format!(
            "missing approval from {missing}"
        )));
    }

    Ok(signers)
}

/// A role transfer in flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleTransfer {
    payload: AssignmentPayload,
    approvals: Vec<SignedApproval>,
    state: TransferState,
    signers: Vec<ActorId>,
}

impl RoleTransfer {
    pub fn propose(payload: AssignmentPayload, approvals: Vec<SignedApproval>) -> Self {
        Self {
            payload,
            approvals,
            state: TransferState::Proposed,
            signers: Vec::new(),
        }
    }

    pub fn payload(&self) -> &AssignmentPayload {
        &self.payload
    }

    pub fn approvals(&self) -> &[SignedApproval] {
        &self.approvals
    }

    pub fn state(&self) -> &TransferState {
        &self.state
    }

    /// Signers recovered during verification.
    pub fn signers(&self) -> &[ActorId] {
        &self.signers
    }

    /// `Proposed -> Verified`, or `Rejected` on any failed check.
    pub fn verify(
        &mut self,
        task: &Task,
        verifier: &dyn SignatureVerifier,
    ) -> Result<(), TaskError> {
        if self.state != TransferState::Proposed {
            return Err(TaskError::InvalidParameter(format!(
                "transfer is {}, only proposed transfers can be verified",
                self.state
            )));
        }

        match verify_assignment(task, &self.payload, &self.approvals, verifier) {
            Ok(signers) => {
                debug!(
                    task = %task.id,
                    selector = %self.payload.selector,
                    signers = signers.len(),
                    "Role transfer verified"
                );
                self.signers = signers;
                self.state = TransferState::Verified;
                Ok(())
            }
            Err(err) => {
                self.reject(err.clone());
                Err(err)
            }
        }
    }

    /// Move to the terminal `Rejected` state.
    pub fn reject(&mut self, reason: TaskError) {
        warn!(
            task = %self.payload.task_id,
            selector = %self.payload.selector,
            reason = %reason,
            "Role transfer rejected"
        );
        self.state = TransferState::Rejected(reason);
    }

    pub(crate) fn mark_applied(&mut self) {
        self.state = TransferState::Applied;
    }
}
