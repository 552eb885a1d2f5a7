//! Signed task role changes through the colony.

mod common;

use colony_kernel::{
    AssignmentPayload, ColonyEventKind, RoleAssignmentArgs, RoleAssignmentFunction, Scope,
    SignatureMode, SignedApproval, TransferState,
};
use colony_types::{DomainId, TaskId, TaskRole};

use common::*;

fn task_in_root(w: &mut World) -> TaskId {
    w.colony
        .make_task(&w.founder.id, Scope::root(), SPECIFICATION_HASH, DomainId::ROOT, None)
        .unwrap()
}

#[test]
fn creator_manages_and_evaluates_new_task() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let record = w.colony.get_task(task).unwrap();

    assert_eq!(record.holder(TaskRole::Manager), Some(w.founder.id));
    assert_eq!(record.holder(TaskRole::Evaluator), Some(w.founder.id));
    assert_eq!(record.holder(TaskRole::Worker), None);
    assert_eq!(record.change_nonce, 0);
}

#[test]
fn worker_assignment_needs_manager_and_worker() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);

    // the manager alone is not enough
    let signed = approvals(&w.colony, selector, &args, &[&w.founder]);
    let err = w
        .colony
        .execute_signed_role_assignment(task, selector, signed, args.clone())
        .unwrap_err();
    assert_eq!(err.reason(), "signature-rejected");

    let signed = approvals(&w.colony, selector, &args, &[&w.founder, &w.user1]);
    let change = w
        .colony
        .execute_signed_role_assignment(task, selector, signed, args)
        .unwrap();

    assert_eq!(change.role, TaskRole::Worker);
    assert_eq!(change.previous, None);
    assert_eq!(change.current, Some(w.user1.id));
    assert_eq!(change.nonce, 1);
    assert_eq!(
        w.colony.get_task(task).unwrap().holder(TaskRole::Worker),
        Some(w.user1.id)
    );
}

#[test]
fn signatures_cannot_be_reused_after_the_nonce_moves() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);
    let payload = w
        .colony
        .role_assignment_payload(task, selector, args.clone())
        .unwrap();
    let signed = sign(
        &payload,
        &[&w.founder, &w.user1],
        &[SignatureMode::Direct, SignatureMode::Direct],
    );

    w.colony
        .execute_signed_payload(payload.clone(), signed.clone())
        .unwrap();

    let remove = RoleAssignmentFunction::RemoveTaskWorkerRole;
    let remove_args = RoleAssignmentArgs::remove(task, DomainId::ROOT);
    let removal = approvals(&w.colony, remove, &remove_args, &[&w.founder, &w.user1]);
    w.colony
        .execute_signed_role_assignment(task, remove, removal, remove_args)
        .unwrap();
    assert_eq!(w.colony.get_task(task).unwrap().holder(TaskRole::Worker), None);

    // same payload, stale nonce
    let err = w
        .colony
        .execute_signed_payload(payload, signed.clone())
        .unwrap_err();
    assert_eq!(err.reason(), "replayed-payload");

    // same signatures against the current nonce
    let err = w
        .colony
        .execute_signed_role_assignment(task, selector, signed, args)
        .unwrap_err();
    assert_eq!(err.reason(), "signature-rejected");

    let record = w.colony.get_task(task).unwrap();
    assert_eq!(record.holder(TaskRole::Worker), None);
    assert_eq!(record.change_nonce, 2);
}

#[test]
fn prefixed_and_direct_signatures_mix() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user2.id, DomainId::ROOT, 0);
    let payload = w
        .colony
        .role_assignment_payload(task, selector, args)
        .unwrap();

    let signed = sign(
        &payload,
        &[&w.founder, &w.user2],
        &[SignatureMode::Prefixed, SignatureMode::Direct],
    );
    w.colony.execute_signed_payload(payload, signed).unwrap();
    assert_eq!(
        w.colony.get_task(task).unwrap().holder(TaskRole::Worker),
        Some(w.user2.id)
    );
}

#[test]
fn signature_mode_is_part_of_what_is_verified() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user2.id, DomainId::ROOT, 0);
    let payload = w
        .colony
        .role_assignment_payload(task, selector, args)
        .unwrap();

    let mut signed = sign(
        &payload,
        &[&w.founder, &w.user2],
        &[SignatureMode::Prefixed, SignatureMode::Direct],
    );
    signed[0].mode = SignatureMode::Direct;

    let err = w.colony.execute_signed_payload(payload, signed).unwrap_err();
    assert_eq!(err.reason(), "signature-rejected");
}

#[test]
fn evaluator_must_be_vacant_before_it_is_reassigned() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let set = RoleAssignmentFunction::SetTaskEvaluatorRole;
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);

    let signed = approvals(&w.colony, set, &args, &[&w.founder, &w.user1]);
    let err = w
        .colony
        .execute_signed_role_assignment(task, set, signed, args.clone())
        .unwrap_err();
    assert_eq!(err.reason(), "role-assignment-execution-failed");

    // the manager is also the outgoing evaluator, so one signature suffices
    let remove = RoleAssignmentFunction::RemoveTaskEvaluatorRole;
    let remove_args = RoleAssignmentArgs::remove(task, DomainId::ROOT);
    let signed = approvals(&w.colony, remove, &remove_args, &[&w.founder]);
    w.colony
        .execute_signed_role_assignment(task, remove, signed, remove_args.clone())
        .unwrap();

    // removing a vacant role fails
    let signed = approvals(&w.colony, remove, &remove_args, &[&w.founder]);
    let err = w
        .colony
        .execute_signed_role_assignment(task, remove, signed, remove_args)
        .unwrap_err();
    assert_eq!(err.reason(), "role-assignment-execution-failed");

    let signed = approvals(&w.colony, set, &args, &[&w.founder, &w.user1]);
    w.colony
        .execute_signed_role_assignment(task, set, signed, args)
        .unwrap();
    assert_eq!(
        w.colony.get_task(task).unwrap().holder(TaskRole::Evaluator),
        Some(w.user1.id)
    );
}

#[test]
fn outsiders_and_duplicates_are_rejected() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let outsider = party("outsider");
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);

    let signed = approvals(&w.colony, selector, &args, &[&w.founder, &outsider]);
    let err = w
        .colony
        .execute_signed_role_assignment(task, selector, signed, args.clone())
        .unwrap_err();
    assert_eq!(err.reason(), "signature-rejected");

    let signed = approvals(&w.colony, selector, &args, &[&w.founder, &w.founder]);
    let err = w
        .colony
        .execute_signed_role_assignment(task, selector, signed, args.clone())
        .unwrap_err();
    assert_eq!(err.reason(), "signature-rejected");

    let signed = approvals(
        &w.colony,
        selector,
        &args,
        &[&w.founder, &w.user1, &outsider],
    );
    let err = w
        .colony
        .execute_signed_role_assignment(task, selector, signed, args)
        .unwrap_err();
    assert_eq!(err.reason(), "signature-rejected");
    assert_eq!(w.colony.get_task(task).unwrap().change_nonce, 0);
}

#[test]
fn tampered_signature_bytes_do_not_verify() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);

    let mut signed: Vec<SignedApproval> =
        approvals(&w.colony, selector, &args, &[&w.founder, &w.user1]);
    signed[1].signature[0] ^= 0xff;

    let err = w
        .colony
        .execute_signed_role_assignment(task, selector, signed, args)
        .unwrap_err();
    assert_eq!(err.reason(), "signature-rejected");
}

#[test]
fn payload_for_another_colony_is_invalid() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);
    let payload =
        AssignmentPayload::new("elsewhere", RoleAssignmentFunction::SetTaskWorkerRole, args, 0);
    let signed = sign(
        &payload,
        &[&w.founder, &w.user1],
        &[SignatureMode::Direct, SignatureMode::Direct],
    );

    let err = w.colony.execute_signed_payload(payload, signed).unwrap_err();
    assert_eq!(err.reason(), "invalid-parameter");
    assert!(w.colony.transfers().is_empty());
}

#[test]
fn mismatched_task_ids_are_invalid() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let other = task_in_root(&mut w);
    let args = RoleAssignmentArgs::assign(other, w.user1.id, DomainId::ROOT, 0);

    let err = w
        .colony
        .execute_signed_role_assignment(
            task,
            RoleAssignmentFunction::SetTaskWorkerRole,
            Vec::new(),
            args,
        )
        .unwrap_err();
    assert_eq!(err.reason(), "invalid-parameter");

    let err = w
        .colony
        .execute_signed_role_assignment(
            TaskId(99),
            RoleAssignmentFunction::SetTaskWorkerRole,
            Vec::new(),
            RoleAssignmentArgs::assign(TaskId(99), w.user1.id, DomainId::ROOT, 0),
        )
        .unwrap_err();
    assert_eq!(err.reason(), "not-found");
}

#[test]
fn transfer_log_and_events_record_outcomes() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);

    let lone = approvals(&w.colony, selector, &args, &[&w.founder]);
    let _ = w
        .colony
        .execute_signed_role_assignment(task, selector, lone, args.clone());
    let both = approvals(&w.colony, selector, &args, &[&w.founder, &w.user1]);
    w.colony
        .execute_signed_role_assignment(task, selector, both, args)
        .unwrap();

    let transfers = w.colony.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].state(), &TransferState::Applied);
    assert_eq!(transfers[0].signers(), &[w.founder.id, w.user1.id]);

    let kinds: Vec<_> = w
        .events
        .events()
        .into_iter()
        .map(|e| e.kind)
        .filter(|k| {
            matches!(
                k,
                ColonyEventKind::TaskRoleAssigned { .. }
                    | ColonyEventKind::TaskRoleAssignmentRejected { .. }
            )
        })
        .collect();
    assert_eq!(kinds.len(), 2);
    assert!(matches!(
        &kinds[0],
        ColonyEventKind::TaskRoleAssignmentRejected { reason, .. } if reason == "signature-rejected"
    ));
    assert!(matches!(
        &kinds[1],
        ColonyEventKind::TaskRoleAssigned { change, .. } if change.current == Some(w.user1.id)
    ));
}

#[test]
fn rejected_assignments_leave_no_trace_in_colony_state() {
    let mut w = setup();
    let task = task_in_root(&mut w);
    let selector = RoleAssignmentFunction::SetTaskWorkerRole;
    let args = RoleAssignmentArgs::assign(task, w.user1.id, DomainId::ROOT, 0);
    let bogus = SignedApproval {
        signer_key: [7; 32],
        signature: vec![0; 64],
        mode: SignatureMode::Direct,
    };

    for _ in 0..100 {
        let err = w
            .colony
            .execute_signed_role_assignment(task, selector, vec![bogus.clone()], args.clone())
            .unwrap_err();
        assert_eq!(err.reason(), "signature-rejected");
    }

    assert!(w.colony.transfers().is_empty());
    let record = w.colony.get_task(task).unwrap();
    assert_eq!(record.change_nonce, 0);
    assert_eq!(record.holder(TaskRole::Worker), None);
    let rejections = w
        .events
        .events()
        .into_iter()
        .filter(|e| matches!(e.kind, ColonyEventKind::TaskRoleAssignmentRejected { .. }))
        .count();
    assert_eq!(rejections, 100);
}
