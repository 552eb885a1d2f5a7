use colony_types::{ActorId, Amount, DomainId, FundingPotId, TokenId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collaborators::Collaborators;
use crate::colony::Colony;
use crate::config::ColonyConfig;
use crate::error::ColonyError;
use crate::identity::seeded_actor;

/// What bootstrapping produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    pub colony: String,
    pub founder: ActorId,
    pub token: TokenId,
    pub minted: Amount,
    pub funded: Amount,
    pub root_balance: Amount,
    pub rewards_balance: Amount,
    pub reputation_cycle: u64,
    pub reputation_log_length: u64,
}

/// Build the meta colony described by `config`.
///
/// Mints the initial supply to the founder, creates the colony, pays the
/// initial funding into it and starts the first reputation cycle.
pub fn bootstrap_meta_colony(
    config: &ColonyConfig,
    collaborators: Collaborators,
) -> Result<(Colony, BootstrapReport), ColonyError> {
    config.validate()?;

    let (_, founder) = seeded_actor(&config.founder);
    let token = config.token();
    let minted = config.initial_supply_amount();
    let funded = config.initial_funding_amount();

    collaborators.tokens.mint(&token, &founder, minted)?;
    let reputation = collaborators.reputation.clone();

    let mut colony = Colony::new(config, founder, collaborators)?;
    if funded > 0 {
        colony.fund_colony(&founder, &token, funded)?;
    }
    let reputation_cycle = reputation.start_next_cycle();

    let root_pot = colony.get_domain(DomainId::ROOT)?.funding_pot;
    let report = BootstrapReport {
        colony: colony.name().to_string(),
        founder,
        root_balance: colony.funding_pot_balance(root_pot, &token)?,
        rewards_balance: colony.funding_pot_balance(FundingPotId::REWARDS, &token)?,
        token,
        minted,
        funded,
        reputation_cycle,
        reputation_log_length: reputation.update_log_length(),
    };

    info!(
        colony = %report.colony,
        founder = %report.founder,
        minted = report.minted,
        funded = report.funded,
        cycle = report.reputation_cycle,
        "Meta colony bootstrapped"
    );
    Ok((colony, report))
}
