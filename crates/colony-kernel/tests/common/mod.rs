#![allow(dead_code)]

use std::sync::Arc;

use colony_kernel::{
    seeded_actor, AssignmentPayload, Collaborators, Colony, ColonyConfig, InMemoryTokenLedger,
    MoveFunds, RecordingEventSink, RoleAssignmentArgs, RoleAssignmentFunction, Scope,
    SignatureMode, SignedApproval, TokenTransfer,
};
use colony_types::{ActorId, Amount, DomainId, FundingPotId, TokenId, WAD};
use ed25519_dalek::SigningKey;

pub const SPECIFICATION_HASH: [u8; 32] = [0x17; 32];
pub const INITIAL_FUNDING: Amount = 100 * WAD;

pub struct Party {
    pub key: SigningKey,
    pub id: ActorId,
}

pub fn party(label: &str) -> Party {
    let (key, id) = seeded_actor(label);
    Party { key, id }
}

pub struct World {
    pub colony: Colony,
    pub tokens: Arc<InMemoryTokenLedger>,
    pub events: Arc<RecordingEventSink>,
    pub founder: Party,
    pub user1: Party,
    pub user2: Party,
}

pub fn clny() -> TokenId {
    TokenId::new("CLNY")
}

/// A colony with reward inverse 100 and subdomains 2 and 3 under the root.
pub fn setup_with(config: ColonyConfig) -> World {
    let tokens = Arc::new(InMemoryTokenLedger::new());
    let events = Arc::new(RecordingEventSink::new());
    let collaborators = Collaborators::in_memory()
        .with_tokens(tokens.clone())
        .with_events(events.clone());

    let founder = party("founder");
    let mut colony = Colony::new(&config, founder.id, collaborators).unwrap();
    colony.set_reward_inverse(&founder.id, 100).unwrap();
    colony.add_domain(&founder.id, Scope::root(), DomainId::ROOT).unwrap();
    colony.add_domain(&founder.id, Scope::root(), DomainId::ROOT).unwrap();

    World {
        colony,
        tokens,
        events,
        founder,
        user1: party("user-1"),
        user2: party("user-2"),
    }
}

pub fn setup() -> World {
    setup_with(ColonyConfig::default())
}

/// Mint `amount` to the founder and pay it into the colony.
pub fn fund_colony(world: &mut World, amount: Amount) {
    world.tokens.mint(&clny(), &world.founder.id, amount).unwrap();
    world
        .colony
        .fund_colony(&world.founder.id, &clny(), amount)
        .unwrap();
}

pub fn move_request(
    permission_domain: u64,
    from_child_skill_index: usize,
    to_child_skill_index: usize,
    from_pot: FundingPotId,
    to_pot: FundingPotId,
    amount: Amount,
) -> MoveFunds {
    MoveFunds {
        permission_domain: DomainId(permission_domain),
        from_child_skill_index,
        to_child_skill_index,
        from_pot,
        to_pot,
        amount,
        token: clny(),
    }
}

pub fn sign(
    payload: &AssignmentPayload,
    signers: &[&Party],
    modes: &[SignatureMode],
) -> Vec<SignedApproval> {
    let digest = payload.digest().unwrap();
    signers
        .iter()
        .zip(modes)
        .map(|(p, mode)| SignedApproval::sign(&p.key, &digest, *mode))
        .collect()
}

/// Build the current payload for a role change and have `signers` approve it.
pub fn approvals(
    colony: &Colony,
    selector: RoleAssignmentFunction,
    args: &RoleAssignmentArgs,
    signers: &[&Party],
) -> Vec<SignedApproval> {
    let payload = colony
        .role_assignment_payload(args.task_id, selector, args.clone())
        .unwrap();
    let modes = vec![SignatureMode::Direct; signers.len()];
    sign(&payload, signers, &modes)
}
