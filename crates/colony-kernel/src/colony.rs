use chrono::{DateTime, Utc};
use colony_authority::{Action, AuthorizationEngine, Scope};
use colony_domains::{Domain, DomainPolicy, DomainTree};
use colony_funding::{FundingPot, FundingPotLedger, FundingError, PotOwner};
use colony_roles::{RoleEntry, RoleStore};
use colony_tasks::{
    AssignmentPayload, RoleAssignmentArgs, RoleAssignmentFunction, RoleTransfer, SignedApproval,
    Task, TaskError, TaskRegistry, TaskRoleChange,
};
use colony_types::{ActorId, Amount, DomainId, FundingPotId, Role, TaskId, TokenId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::collaborators::Collaborators;
use crate::config::ColonyConfig;
use crate::error::ColonyError;
use crate::events::{ColonyEvent, ColonyEventKind};

/// Roles the founder receives in the root domain.
const FOUNDER_ROLES: [Role; 6] = [
    Role::Recovery,
    Role::Root,
    Role::Arbitration,
    Role::Architecture,
    Role::Funding,
    Role::Administration,
];

/// A move between two funding pots.
///
/// Each child skill index locates the owning domain of its pot below the
/// permission domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFunds {
    pub permission_domain: DomainId,
    pub from_child_skill_index: usize,
    pub to_child_skill_index: usize,
    pub from_pot: FundingPotId,
    pub to_pot: FundingPotId,
    pub amount: Amount,
    pub token: TokenId,
}

/// Point-in-time view of a colony's state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColonySummary {
    pub name: String,
    pub token: TokenId,
    pub reward_inverse: u64,
    pub domains: Vec<Domain>,
    pub pots: Vec<FundingPot>,
    /// Stored role bits.
    pub roles: Vec<RoleEntry>,
    /// Roles as `has_user_role` reports them, derived roles included.
    pub effective_roles: Vec<RoleEntry>,
    pub tasks: Vec<Task>,
}

/// The single entry point for every privileged colony operation.
///
/// Each operation authorizes first and mutates only when every check has
/// passed, so a failed call leaves no trace.
pub struct Colony {
    name: String,
    native_token: TokenId,
    address: ActorId,
    reward_inverse: u64,
    domains: DomainTree,
    policy: Box<dyn DomainPolicy>,
    pots: FundingPotLedger,
    roles: RoleStore,
    tasks: TaskRegistry,
    transfers: Vec<RoleTransfer>,
    collaborators: Collaborators,
}

impl Colony {
    /// Create a colony with its root domain; `founder` gets every root role.
    pub fn new(
        config: &ColonyConfig,
        founder: ActorId,
        collaborators: Collaborators,
    ) -> Result<Self, ColonyError> {
        config.validate()?;

        let mut pots = FundingPotLedger::new();
        let root_pot = pots.open_pot(PotOwner::Domain(DomainId::ROOT));
        let domains = DomainTree::new(root_pot);

        let mut roles = RoleStore::new();
        for role in FOUNDER_ROLES {
            roles.set_role(&founder, DomainId::ROOT, role, true)?;
        }

        let colony = Self {
            name: config.name.clone(),
            native_token: config.token(),
            address: ActorId::from_label(&format!("colony:{}", config.name)),
            reward_inverse: config.reward_inverse,
            domains,
            policy: config.domain_policy.build(),
            pots,
            roles,
            tasks: TaskRegistry::new(),
            transfers: Vec::new(),
            collaborators,
        };

        info!(
            colony = %colony.name,
            founder = %founder,
            policy = colony.policy.name(),
            "Colony created"
        );
        colony.emit(ColonyEventKind::ColonyCreated {
            name: colony.name.clone(),
            founder,
            token: colony.native_token.clone(),
        });
        Ok(colony)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native_token(&self) -> &TokenId {
        &self.native_token
    }

    /// The colony's own account in the token ledger.
    pub fn address(&self) -> ActorId {
        self.address
    }

    pub fn reward_inverse(&self) -> u64 {
        self.reward_inverse
    }

    pub fn domains(&self) -> &DomainTree {
        &self.domains
    }

    pub fn roles(&self) -> &RoleStore {
        &self.roles
    }

    pub fn pots(&self) -> &FundingPotLedger {
        &self.pots
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Every signed transfer this colony has applied. Rejections are only
    /// reported through the event sink.
    pub fn transfers(&self) -> &[RoleTransfer] {
        &self.transfers
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn engine(&self) -> AuthorizationEngine<'_> {
        AuthorizationEngine::new(&self.domains, &self.roles)
    }

    // ── Roles ───────────────────────────────────────────────────────

    /// Role lookup with inheritance applied.
    pub fn has_user_role(&self, actor: &ActorId, domain: DomainId, role: Role) -> bool {
        self.engine().has_user_role(actor, domain, role)
    }

    pub fn set_root_role(
        &mut self,
        caller: &ActorId,
        user: &ActorId,
        enabled: bool,
    ) -> Result<(), ColonyError> {
        self.set_role(caller, Scope::root(), user, DomainId::ROOT, Role::Root, enabled)
    }

    pub fn set_recovery_role(
        &mut self,
        caller: &ActorId,
        user: &ActorId,
        enabled: bool,
    ) -> Result<(), ColonyError> {
        self.set_role(caller, Scope::root(), user, DomainId::ROOT, Role::Recovery, enabled)
    }

    pub fn set_architecture_role(
        &mut self,
        caller: &ActorId,
        scope: Scope,
        user: &ActorId,
        domain: DomainId,
        enabled: bool,
    ) -> Result<(), ColonyError> {
        self.set_role(caller, scope, user, domain, Role::Architecture, enabled)
    }

    pub fn set_funding_role(
        &mut self,
        caller: &ActorId,
        scope: Scope,
        user: &ActorId,
        domain: DomainId,
        enabled: bool,
    ) -> Result<(), ColonyError> {
        self.set_role(caller, scope, user, domain, Role::Funding, enabled)
    }

    pub fn set_administration_role(
        &mut self,
        caller: &ActorId,
        scope: Scope,
        user: &ActorId,
        domain: DomainId,
        enabled: bool,
    ) -> Result<(), ColonyError> {
        self.set_role(caller, scope, user, domain, Role::Administration, enabled)
    }

    pub fn set_arbitration_role(
        &mut self,
        caller: &ActorId,
        scope: Scope,
        user: &ActorId,
        domain: DomainId,
        enabled: bool,
    ) -> Result<(), ColonyError> {
        self.set_role(caller, scope, user, domain, Role::Arbitration, enabled)
    }

    /// Grant or revoke `role` for `user` in `domain`, through the setter the
    /// role's capability names.
    pub fn set_role(
        &mut self,
        caller: &ActorId,
        scope: Scope,
        user: &ActorId,
        domain: DomainId,
        role: Role,
        enabled: bool,
    ) -> Result<(), ColonyError> {
        let action = Action::setter_for(role).ok_or_else(|| {
            ColonyError::InvalidParameter(format!("role {role} cannot be set directly"))
        })?;
        self.engine().authorize(caller, scope, domain, action)?;

        let changed = self.roles.set_role(user, domain, role, enabled)?;
        if changed {
            self.emit(ColonyEventKind::RoleSet {
                by: *caller,
                user: *user,
                domain,
                role,
                enabled,
            });
        }
        Ok(())
    }

    // ── Domains ─────────────────────────────────────────────────────

    /// Create a domain under `parent`, with a fresh funding pot.
    pub fn add_domain(
        &mut self,
        caller: &ActorId,
        scope: Scope,
        parent: DomainId,
    ) -> Result<DomainId, ColonyError> {
        self.engine().authorize(caller, scope, parent, Action::AddDomain)?;
        self.policy.check_parent(&self.domains, parent)?;

        let funding_pot = self.pots.open_pot(PotOwner::Domain(self.domains.next_id()));
        let domain = self.domains.insert(parent, funding_pot)?;

        info!(
            colony = %self.name,
            domain = %domain,
            parent = %parent,
            by = %caller,
            "Domain added"
        );
        self.emit(ColonyEventKind::DomainAdded {
            domain,
            parent,
            funding_pot,
        });
        Ok(domain)
    }

    pub fn get_domain(&self, id: DomainId) -> Result<&Domain, ColonyError> {
        Ok(self.domains.get(id)?)
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    // ── Funding ─────────────────────────────────────────────────────

    pub fn funding_pot_balance(
        &self,
        pot: FundingPotId,
        token: &TokenId,
    ) -> Result<Amount, ColonyError> {
        Ok(self.pots.balance(pot, token)?)
    }

    /// The domain whose authority governs `pot`.
    pub fn pot_domain(&self, pot: FundingPotId) -> Result<DomainId, ColonyError> {
        self.governing_domain(pot)?
            .ok_or_else(|| FundingError::RewardsPotLocked.into())
    }

    /// `None` for the rewards pot, which no domain governs.
    fn governing_domain(&self, pot: FundingPotId) -> Result<Option<DomainId>, ColonyError> {
        match self.pots.owner_of(pot)? {
            PotOwner::Rewards => Ok(None),
            PotOwner::Domain(domain) => Ok(Some(domain)),
            PotOwner::Task(task) => Ok(Some(self.tasks.get(task)?.domain)),
        }
    }

    pub fn move_funds_between_pots(
        &mut self,
        caller: &ActorId,
        request: MoveFunds,
    ) -> Result<(), ColonyError> {
        let from_domain = self.governing_domain(request.from_pot)?;
        let to_domain = self.governing_domain(request.to_pot)?;

        match (from_domain, to_domain) {
            (Some(from_domain), Some(to_domain)) => {
                self.engine().authorize_move(
                    caller,
                    request.permission_domain,
                    (request.from_child_skill_index, from_domain),
                    (request.to_child_skill_index, to_domain),
                )?;
            }
            _ => {
                // The rewards pot has no path to check; Funding over the
                // permission domain is still required before it is refused.
                self.engine().authorize(
                    caller,
                    Scope::at(request.permission_domain),
                    request.permission_domain,
                    Action::MoveFunds,
                )?;
                return Err(FundingError::RewardsPotLocked.into());
            }
        }
        self.pots.move_funds(
            request.from_pot,
            request.to_pot,
            &request.token,
            request.amount,
        )?;

        self.emit(ColonyEventKind::FundsMoved {
            by: *caller,
            from: request.from_pot,
            to: request.to_pot,
            token: request.token,
            amount: request.amount,
        });
        Ok(())
    }

    /// Pull `amount` of `token` from `from` into the colony.
    ///
    /// One in `reward_inverse` goes to the rewards pot, the rest to the root
    /// domain's pot.
    pub fn fund_colony(
        &mut self,
        from: &ActorId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<(), ColonyError> {
        if amount == 0 {
            return Err(ColonyError::InvalidParameter("funding amount must be positive".into()));
        }
        let root_pot = self.domains.get(DomainId::ROOT)?.funding_pot;
        let reward_fee = amount / Amount::from(self.reward_inverse);
        let remainder = amount - reward_fee;

        self.pots.check_deposit(root_pot, token, amount)?;
        self.pots.check_deposit(FundingPotId::REWARDS, token, reward_fee)?;
        self.collaborators
            .tokens
            .transfer(token, from, &self.address, amount)?;

        self.pots.deposit(root_pot, token, remainder)?;
        self.pots.deposit(FundingPotId::REWARDS, token, reward_fee)?;

        info!(
            colony = %self.name,
            from = %from,
            token = %token,
            amount = amount,
            reward_fee = reward_fee,
            "Colony funded"
        );
        self.emit(ColonyEventKind::ColonyFunded {
            from: *from,
            token: token.clone(),
            amount,
            reward_fee,
        });
        Ok(())
    }

    pub fn set_reward_inverse(
        &mut self,
        caller: &ActorId,
        reward_inverse: u64,
    ) -> Result<(), ColonyError> {
        self.engine()
            .authorize(caller, Scope::root(), DomainId::ROOT, Action::SetRewardInverse)?;
        if reward_inverse == 0 {
            return Err(ColonyError::InvalidParameter("reward inverse must be positive".into()));
        }
        self.reward_inverse = reward_inverse;
        self.emit(ColonyEventKind::RewardInverseSet { reward_inverse });
        Ok(())
    }

    // ── Tasks ───────────────────────────────────────────────────────

    /// Create a task in `domain` with its own funding pot. The caller becomes
    /// its manager.
    pub fn make_task(
        &mut self,
        caller: &ActorId,
        scope: Scope,
        specification_hash: [u8; 32],
        domain: DomainId,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<TaskId, ColonyError> {
        self.engine().authorize(caller, scope, domain, Action::MakeTask)?;

        let funding_pot = self.pots.open_pot(PotOwner::Task(self.tasks.next_id()));
        let task = self
            .tasks
            .create(*caller, domain, funding_pot, specification_hash, due_date);

        self.emit(ColonyEventKind::TaskAdded {
            task,
            domain,
            funding_pot,
        });
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> Result<&Task, ColonyError> {
        Ok(self.tasks.get(id)?)
    }

    /// The payload the parties must sign for a role change, bound to the
    /// task's current nonce.
    pub fn role_assignment_payload(
        &self,
        task: TaskId,
        selector: RoleAssignmentFunction,
        args: RoleAssignmentArgs,
    ) -> Result<AssignmentPayload, ColonyError> {
        if args.task_id != task {
            return Err(ColonyError::InvalidParameter(format!(
                "call names {task} but args name {}",
                args.task_id
            )));
        }
        let nonce = self.tasks.get(task)?.change_nonce;
        let payload = AssignmentPayload::new(self.name.clone(), selector, args, nonce);
        payload.validate()?;
        Ok(payload)
    }

    /// Apply a signed role change against the task's current nonce.
    pub fn execute_signed_role_assignment(
        &mut self,
        task: TaskId,
        selector: RoleAssignmentFunction,
        approvals: Vec<SignedApproval>,
        args: RoleAssignmentArgs,
    ) -> Result<TaskRoleChange, ColonyError> {
        let payload = self.role_assignment_payload(task, selector, args)?;
        self.execute_signed_payload(payload, approvals)
    }

    /// Apply a signed role change carrying an explicit payload.
    ///
    /// A payload whose nonce is no longer current fails as a replay.
    pub fn execute_signed_payload(
        &mut self,
        payload: AssignmentPayload,
        approvals: Vec<SignedApproval>,
    ) -> Result<TaskRoleChange, ColonyError> {
        if payload.colony != self.name {
            return Err(ColonyError::InvalidParameter(format!(
                "payload is for colony {}, not {}",
                payload.colony, self.name
            )));
        }
        let task = self.tasks.get(payload.task_id)?.clone();
        let selector = payload.selector;

        let mut transfer = RoleTransfer::propose(payload, approvals);
        match self.run_transfer(&task, &mut transfer) {
            Ok(change) => {
                self.transfers.push(transfer);
                self.emit(ColonyEventKind::TaskRoleAssigned {
                    selector,
                    change: change.clone(),
                });
                Ok(change)
            }
            Err(err) => {
                self.emit(ColonyEventKind::TaskRoleAssignmentRejected {
                    task: task.id,
                    selector,
                    reason: err.reason().to_string(),
                });
                Err(err)
            }
        }
    }

    fn run_transfer(
        &mut self,
        task: &Task,
        transfer: &mut RoleTransfer,
    ) -> Result<TaskRoleChange, ColonyError> {
        transfer.verify(task, self.collaborators.verifier.as_ref())?;

        if transfer.payload().selector == RoleAssignmentFunction::SetTaskManagerRole {
            let args = &transfer.payload().args;
            let scope = Scope::new(args.permission_domain, args.child_skill_index);
            let new_manager = args.user.ok_or_else(|| {
                ColonyError::InvalidParameter("set-task-manager-role needs a user".into())
            })?;

            if let Err(err) =
                self.engine()
                    .authorize(&new_manager, scope, task.domain, Action::HoldTaskManager)
            {
                let reason = format!("{new_manager} cannot manage {}: {err}", task.id);
                warn!(task = %task.id, manager = %new_manager, "Incoming manager lacks administration");
                transfer.reject(TaskError::RoleAssignmentExecutionFailed(reason.clone()));
                return Err(ColonyError::RoleAssignmentExecutionFailed(reason));
            }
        }

        self.tasks.apply(transfer).map_err(|err| {
            transfer.reject(err.clone());
            ColonyError::from(err)
        })
    }

    // ── Views ───────────────────────────────────────────────────────

    pub fn summary(&self) -> ColonySummary {
        ColonySummary {
            name: self.name.clone(),
            token: self.native_token.clone(),
            reward_inverse: self.reward_inverse,
            domains: self.domains.iter().cloned().collect(),
            pots: self.pots.pots().cloned().collect(),
            roles: self.roles.snapshot(),
            effective_roles: self.effective_roles(),
            tasks: self.tasks.iter().cloned().collect(),
        }
    }

    /// Every non-empty effective role set of every actor holding a stored
    /// role, ordered by domain.
    pub fn effective_roles(&self) -> Vec<RoleEntry> {
        let mut actors: Vec<ActorId> = self
            .roles
            .snapshot()
            .into_iter()
            .filter(|entry| !entry.roles.is_empty())
            .map(|entry| entry.actor)
            .collect();
        actors.sort();
        actors.dedup();

        let engine = self.engine();
        let mut rows = Vec::new();
        for domain in self.domains.iter() {
            for actor in &actors {
                let roles = engine.effective_roles(actor, domain.id);
                if !roles.is_empty() {
                    rows.push(RoleEntry {
                        actor: *actor,
                        domain: domain.id,
                        roles,
                    });
                }
            }
        }
        rows
    }

    fn emit(&self, kind: ColonyEventKind) {
        self.collaborators
            .events
            .emit(&ColonyEvent::new(self.name.clone(), kind));
    }
}
