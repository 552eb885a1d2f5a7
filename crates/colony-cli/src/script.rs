//! Scripted colony runs.
//!
//! A script is a TOML file with an optional `[colony]` table and a list of
//! `[[step]]` entries. Actors are named by label and get deterministic keys,
//! so a script can sign role assignments without any key material.
//!
//! ```toml
//! [[step]]
//! op = "set-role"
//! caller = "founder"
//! user = "user-1"
//! domain = 2
//! role = "funding"
//! child_skill_index = 0
//!
//! [[step]]
//! op = "add-domain"
//! caller = "user-1"
//! parent = 1
//! expect = "unauthorized"
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use colony_kernel::{
    seeded_actor, Colony, ColonyConfig, ColonyError, MoveFunds, RoleAssignmentArgs,
    RoleAssignmentFunction, Scope, SignatureMode, SignedApproval,
};
use colony_types::{ActorId, Amount, DomainId, FundingPotId, Role, TaskId, TokenId, WAD};
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn root_domain() -> u64 {
    DomainId::ROOT.0
}

fn enabled() -> bool {
    true
}

/// A parsed script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Overrides the loaded colony configuration.
    #[serde(default)]
    pub colony: Option<ColonyConfig>,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing script {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// One scripted call, with the failure reason it is expected to produce.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub op: StepOp,

    #[serde(default)]
    pub expect: Option<String>,
}

/// Amounts are whole tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum StepOp {
    Mint {
        to: String,
        amount: u64,
        #[serde(default)]
        token: Option<String>,
    },
    Fund {
        from: String,
        amount: u64,
        #[serde(default)]
        token: Option<String>,
    },
    SetRewardInverse {
        caller: String,
        reward_inverse: u64,
    },
    AddDomain {
        caller: String,
        #[serde(default = "root_domain")]
        permission_domain: u64,
        #[serde(default)]
        child_skill_index: usize,
        parent: u64,
    },
    SetRole {
        caller: String,
        #[serde(default = "root_domain")]
        permission_domain: u64,
        #[serde(default)]
        child_skill_index: usize,
        user: String,
        domain: u64,
        role: Role,
        #[serde(default = "enabled")]
        enabled: bool,
    },
    HasRole {
        user: String,
        domain: u64,
        role: Role,
        #[serde(default = "enabled")]
        held: bool,
    },
    /// The exact set of actors storing `role` in `domain`.
    Holders {
        domain: u64,
        role: Role,
        #[serde(default)]
        users: Vec<String>,
    },
    MoveFunds {
        caller: String,
        #[serde(default = "root_domain")]
        permission_domain: u64,
        #[serde(default)]
        from_child_skill_index: usize,
        #[serde(default)]
        to_child_skill_index: usize,
        from_pot: u64,
        to_pot: u64,
        amount: u64,
        #[serde(default)]
        token: Option<String>,
    },
    Balance {
        pot: u64,
        amount: u64,
        #[serde(default)]
        token: Option<String>,
    },
    MakeTask {
        caller: String,
        #[serde(default = "root_domain")]
        permission_domain: u64,
        #[serde(default)]
        child_skill_index: usize,
        domain: u64,
        specification: String,
    },
    AssignTaskRole {
        task: u64,
        function: RoleAssignmentFunction,
        #[serde(default)]
        user: Option<String>,
        #[serde(default = "root_domain")]
        permission_domain: u64,
        #[serde(default)]
        child_skill_index: usize,
        signers: Vec<String>,
        /// Signers that approve with the prefixed message form.
        #[serde(default)]
        prefixed: Vec<String>,
    },
}

impl StepOp {
    pub fn name(&self) -> &'static str {
        match self {
            StepOp::Mint { .. } => "mint",
            StepOp::Fund { .. } => "fund",
            StepOp::SetRewardInverse { .. } => "set-reward-inverse",
            StepOp::AddDomain { .. } => "add-domain",
            StepOp::SetRole { .. } => "set-role",
            StepOp::HasRole { .. } => "has-role",
            StepOp::Holders { .. } => "holders",
            StepOp::MoveFunds { .. } => "move-funds",
            StepOp::Balance { .. } => "balance",
            StepOp::MakeTask { .. } => "make-task",
            StepOp::AssignTaskRole { .. } => "assign-task-role",
        }
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Ok { detail: String },
    Failed { reason: String, message: String },
}

impl Outcome {
    fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Ok { .. } => None,
            Outcome::Failed { reason, .. } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub outcome: Outcome,
    pub expected: Option<String>,
    /// Whether the outcome matched the expectation.
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub steps: Vec<StepReport>,
}

impl ScriptReport {
    pub fn mismatches(&self) -> usize {
        self.steps.iter().filter(|s| !s.matched).count()
    }
}

/// Runs steps against one colony, resolving actor labels to seeded keys.
pub struct ScriptRunner {
    colony: Colony,
    actors: HashMap<String, (SigningKey, ActorId)>,
}

impl ScriptRunner {
    pub fn new(colony: Colony) -> Self {
        Self {
            colony,
            actors: HashMap::new(),
        }
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    pub fn run(&mut self, steps: &[Step]) -> ScriptReport {
        let steps = steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let outcome = match self.apply(&step.op) {
                    Ok(detail) => Outcome::Ok { detail },
                    Err(err) => Outcome::Failed {
                        reason: err.reason().to_string(),
                        message: err.to_string(),
                    },
                };
                let matched = outcome.reason() == step.expect.as_deref();
                if matched {
                    debug!(step = index, op = step.op.name(), outcome = ?outcome, "Step finished");
                } else {
                    warn!(
                        step = index,
                        op = step.op.name(),
                        expected = ?step.expect,
                        outcome = ?outcome,
                        "Step did not match expectation"
                    );
                }
                StepReport {
                    index,
                    op: step.op.name(),
                    outcome,
                    expected: step.expect.clone(),
                    matched,
                }
            })
            .collect();
        ScriptReport { steps }
    }

    fn actor(&mut self, label: &str) -> ActorId {
        self.actors
            .entry(label.to_string())
            .or_insert_with(|| seeded_actor(label))
            .1
    }

    fn key(&mut self, label: &str) -> SigningKey {
        self.actors
            .entry(label.to_string())
            .or_insert_with(|| seeded_actor(label))
            .0
            .clone()
    }

    fn token(&self, token: Option<&str>) -> TokenId {
        token
            .map(TokenId::new)
            .unwrap_or_else(|| self.colony.native_token().clone())
    }

    fn apply(&mut self, op: &StepOp) -> Result<String, ColonyError> {
        match op {
            StepOp::Mint { to, amount, token } => {
                let to = self.actor(to);
                let token = self.token(token.as_deref());
                self.colony
                    .collaborators()
                    .tokens
                    .mint(&token, &to, whole(*amount))?;
                Ok(format!("minted {amount} {token} to {}", to.short_id()))
            }
            StepOp::Fund {
                from,
                amount,
                token,
            } => {
                let from = self.actor(from);
                let token = self.token(token.as_deref());
                self.colony.fund_colony(&from, &token, whole(*amount))?;
                Ok(format!("funded colony with {amount} {token}"))
            }
            StepOp::SetRewardInverse {
                caller,
                reward_inverse,
            } => {
                let caller = self.actor(caller);
                self.colony.set_reward_inverse(&caller, *reward_inverse)?;
                Ok(format!("reward inverse {reward_inverse}"))
            }
            StepOp::AddDomain {
                caller,
                permission_domain,
                child_skill_index,
                parent,
            } => {
                let caller = self.actor(caller);
                let scope = Scope::new(DomainId(*permission_domain), *child_skill_index);
                let domain = self.colony.add_domain(&caller, scope, DomainId(*parent))?;
                let pot = self.colony.get_domain(domain)?.funding_pot;
                Ok(format!("{domain} with {pot}"))
            }
            StepOp::SetRole {
                caller,
                permission_domain,
                child_skill_index,
                user,
                domain,
                role,
                enabled,
            } => {
                let caller = self.actor(caller);
                let user_id = self.actor(user);
                let scope = Scope::new(DomainId(*permission_domain), *child_skill_index);
                self.colony
                    .set_role(&caller, scope, &user_id, DomainId(*domain), *role, *enabled)?;
                let verb = if *enabled { "granted" } else { "revoked" };
                Ok(format!("{role} {verb} for {user} in {}", DomainId(*domain)))
            }
            StepOp::HasRole {
                user,
                domain,
                role,
                held,
            } => {
                let user_id = self.actor(user);
                let actual = self.colony.has_user_role(&user_id, DomainId(*domain), *role);
                if actual != *held {
                    return Err(ColonyError::InvalidParameter(format!(
                        "{user} {} {role} in {}",
                        if actual { "holds" } else { "lacks" },
                        DomainId(*domain)
                    )));
                }
                Ok(format!("{user} {role} in {}: {actual}", DomainId(*domain)))
            }
            StepOp::Holders { domain, role, users } => {
                let domain = DomainId(*domain);
                let mut expected: Vec<_> = users.iter().map(|user| self.actor(user)).collect();
                expected.sort();
                expected.dedup();
                let actual = self.colony.roles().holders(domain, *role);
                if actual != expected {
                    return Err(ColonyError::InvalidParameter(format!(
                        "{role} in {domain} is held by {} actors, expected {}",
                        actual.len(),
                        expected.len()
                    )));
                }
                Ok(format!("{role} in {domain}: {}", users.join(", ")))
            }
            StepOp::MoveFunds {
                caller,
                permission_domain,
                from_child_skill_index,
                to_child_skill_index,
                from_pot,
                to_pot,
                amount,
                token,
            } => {
                let caller = self.actor(caller);
                let token = self.token(token.as_deref());
                self.colony.move_funds_between_pots(
                    &caller,
                    MoveFunds {
                        permission_domain: DomainId(*permission_domain),
                        from_child_skill_index: *from_child_skill_index,
                        to_child_skill_index: *to_child_skill_index,
                        from_pot: FundingPotId(*from_pot),
                        to_pot: FundingPotId(*to_pot),
                        amount: whole(*amount),
                        token: token.clone(),
                    },
                )?;
                Ok(format!(
                    "moved {amount} {token} from {} to {}",
                    FundingPotId(*from_pot),
                    FundingPotId(*to_pot)
                ))
            }
            StepOp::Balance { pot, amount, token } => {
                let token = self.token(token.as_deref());
                let pot = FundingPotId(*pot);
                let actual = self.colony.funding_pot_balance(pot, &token)?;
                if actual != whole(*amount) {
                    return Err(ColonyError::InvalidParameter(format!(
                        "{pot} holds {} {token}, not {amount}",
                        format_amount(actual)
                    )));
                }
                Ok(format!("{pot} holds {amount} {token}"))
            }
            StepOp::MakeTask {
                caller,
                permission_domain,
                child_skill_index,
                domain,
                specification,
            } => {
                let caller = self.actor(caller);
                let scope = Scope::new(DomainId(*permission_domain), *child_skill_index);
                let hash = *blake3::hash(specification.as_bytes()).as_bytes();
                let task = self
                    .colony
                    .make_task(&caller, scope, hash, DomainId(*domain), None)?;
                let pot = self.colony.get_task(task)?.funding_pot;
                Ok(format!("{task} with {pot}"))
            }
            StepOp::AssignTaskRole {
                task,
                function,
                user,
                permission_domain,
                child_skill_index,
                signers,
                prefixed,
            } => {
                let task = TaskId(*task);
                let args = match user {
                    Some(user) => RoleAssignmentArgs::assign(
                        task,
                        self.actor(user),
                        DomainId(*permission_domain),
                        *child_skill_index,
                    ),
                    None => RoleAssignmentArgs::remove(task, DomainId(*permission_domain)),
                };
                let payload = self
                    .colony
                    .role_assignment_payload(task, *function, args.clone())?;
                let digest = payload.digest()?;

                let approvals: Vec<SignedApproval> = signers
                    .iter()
                    .map(|label| {
                        let mode = if prefixed.contains(label) {
                            SignatureMode::Prefixed
                        } else {
                            SignatureMode::Direct
                        };
                        SignedApproval::sign(&self.key(label), &digest, mode)
                    })
                    .collect();

                let change = self
                    .colony
                    .execute_signed_role_assignment(task, *function, approvals, args)?;
                Ok(format!("{function} on {task}, nonce {}", change.nonce))
            }
        }
    }
}

/// Build the colony a script runs against.
pub fn script_config(script: &Script, loaded: &ColonyConfig) -> ColonyConfig {
    script.colony.clone().unwrap_or_else(|| loaded.clone())
}

fn whole(amount: u64) -> Amount {
    Amount::from(amount) * WAD
}

/// Render an amount in whole tokens, keeping any fractional part.
pub fn format_amount(amount: Amount) -> String {
    let whole = amount / WAD;
    let fraction = amount % WAD;
    if fraction == 0 {
        whole.to_string()
    } else {
        let digits = format!("{fraction:018}");
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_kernel::{bootstrap_meta_colony, Collaborators};

    fn runner() -> ScriptRunner {
        let (colony, _) =
            bootstrap_meta_colony(&ColonyConfig::default(), Collaborators::in_memory()).unwrap();
        ScriptRunner::new(colony)
    }

    fn run(script: &str) -> ScriptReport {
        let script = Script::parse(script).unwrap();
        runner().run(&script.steps)
    }

    #[test]
    fn parses_steps_with_defaults() {
        let script = Script::parse(
            r#"
            [[step]]
            op = "add-domain"
            caller = "founder"
            parent = 1

            [[step]]
            op = "set-role"
            caller = "founder"
            user = "user-1"
            domain = 2
            role = "funding"
            child_skill_index = 0
            expect = "unauthorized"
            "#,
        )
        .unwrap();

        assert!(script.colony.is_none());
        assert_eq!(script.steps.len(), 2);
        match &script.steps[0].op {
            StepOp::AddDomain {
                permission_domain,
                child_skill_index,
                parent,
                ..
            } => assert_eq!((*permission_domain, *child_skill_index, *parent), (1, 0, 1)),
            other => panic!("unexpected step {other:?}"),
        }
        match &script.steps[1].op {
            StepOp::SetRole { role, enabled, .. } => {
                assert_eq!(*role, Role::Funding);
                assert!(*enabled);
            }
            other => panic!("unexpected step {other:?}"),
        }
        assert_eq!(script.steps[1].expect.as_deref(), Some("unauthorized"));
    }

    #[test]
    fn holders_lists_stored_roles_only() {
        let report = run(
            r#"
            [[step]]
            op = "add-domain"
            caller = "founder"
            parent = 1

            [[step]]
            op = "set-role"
            caller = "founder"
            user = "user-1"
            domain = 2
            role = "funding"

            [[step]]
            op = "holders"
            domain = 2
            role = "funding"
            users = ["user-1"]

            [[step]]
            op = "holders"
            domain = 2
            role = "architecture-subdomain"

            [[step]]
            op = "holders"
            domain = 1
            role = "funding"
            users = ["founder", "user-1"]
            expect = "invalid-parameter"
            "#,
        );
        assert_eq!(report.mismatches(), 0);
        assert!(matches!(
            &report.steps[2].outcome,
            Outcome::Ok { detail } if detail == "funding in domain:2: user-1"
        ));
    }

    #[test]
    fn unknown_op_is_a_parse_error() {
        assert!(Script::parse("[[step]]\nop = \"dissolve\"\n").is_err());
    }

    #[test]
    fn expected_failures_match() {
        let report = run(
            r#"
            [[step]]
            op = "add-domain"
            caller = "user-1"
            parent = 1
            expect = "unauthorized"

            [[step]]
            op = "add-domain"
            caller = "founder"
            parent = 1
            "#,
        );
        assert_eq!(report.mismatches(), 0);
        assert_eq!(report.steps[0].outcome.reason(), Some("unauthorized"));
        assert!(matches!(&report.steps[1].outcome, Outcome::Ok { detail } if detail.starts_with("domain:2")));
    }

    #[test]
    fn unexpected_outcomes_are_counted() {
        let report = run(
            r#"
            [[step]]
            op = "add-domain"
            caller = "founder"
            parent = 1
            expect = "unauthorized"

            [[step]]
            op = "add-domain"
            caller = "user-1"
            parent = 1
            "#,
        );
        assert_eq!(report.mismatches(), 2);
    }

    #[test]
    fn funding_and_balances() {
        let report = run(
            r#"
            [[step]]
            op = "add-domain"
            caller = "founder"
            parent = 1

            [[step]]
            op = "move-funds"
            caller = "founder"
            to_child_skill_index = 0
            from_pot = 1
            to_pot = 2
            amount = 10

            [[step]]
            op = "balance"
            pot = 2
            amount = 10

            [[step]]
            op = "balance"
            pot = 1
            amount = 980

            [[step]]
            op = "balance"
            pot = 0
            amount = 10
            "#,
        );
        assert_eq!(report.mismatches(), 0, "{report:?}");
    }

    #[test]
    fn signed_assignment_through_labels() {
        let report = run(
            r#"
            [[step]]
            op = "make-task"
            caller = "founder"
            domain = 1
            specification = "write the docs"

            [[step]]
            op = "assign-task-role"
            task = 1
            function = "set-task-worker-role"
            user = "worker"
            signers = ["founder", "worker"]
            prefixed = ["worker"]

            [[step]]
            op = "assign-task-role"
            task = 1
            function = "set-task-worker-role"
            user = "other"
            signers = ["founder", "other"]
            expect = "role-assignment-execution-failed"

            [[step]]
            op = "assign-task-role"
            task = 1
            function = "remove-task-worker-role"
            signers = ["founder"]
            expect = "signature-rejected"
            "#,
        );
        assert_eq!(report.mismatches(), 0, "{report:?}");
    }

    #[test]
    fn script_colony_table_overrides_loaded_config() {
        let script = Script::parse(
            r#"
            [colony]
            name = "scripted"
            reward_inverse = 10
            "#,
        )
        .unwrap();
        let config = script_config(&script, &ColonyConfig::default());
        assert_eq!(config.name, "scripted");
        assert_eq!(config.reward_inverse, 10);
        assert_eq!(config.native_token, "CLNY");
    }

    #[test]
    fn amounts_render_in_whole_tokens() {
        assert_eq!(format_amount(3 * WAD), "3");
        assert_eq!(format_amount(WAD + WAD / 4), "1.25");
        assert_eq!(format_amount(0), "0");
    }
}
