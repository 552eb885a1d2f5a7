use std::collections::{BTreeMap, HashMap};

use colony_types::{Amount, DomainId, FundingPotId, TaskId, TokenId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FundingError;

/// The entity a funding pot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum PotOwner {
    Rewards,
    Domain(DomainId),
    Task(TaskId),
}

/// A funding pot and its per-token balances.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FundingPot {
    pub id: FundingPotId,
    pub owner: PotOwner,
    balances: BTreeMap<TokenId, Amount>,
}

impl FundingPot {
    fn new(id: FundingPotId, owner: PotOwner) -> Self {
        Self {
            id,
            owner,
            balances: BTreeMap::new(),
        }
    }

    pub fn balance(&self, token: &TokenId) -> Amount {
        self.balances.get(token).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<TokenId, Amount> {
        &self.balances
    }
}

/// Funding pot ledger.
///
/// Pot ids are shared by domains and tasks and assigned monotonically; pot 0
/// is opened at construction as the rewards pot.
pub struct FundingPotLedger {
    pots: BTreeMap<FundingPotId, FundingPot>,
    next_id: u64,
    inflow: HashMap<TokenId, Amount>,
}

impl FundingPotLedger {
    pub fn new() -> Self {
        let mut pots = BTreeMap::new();
        pots.insert(
            FundingPotId::REWARDS,
            FundingPot::new(FundingPotId::REWARDS, PotOwner::Rewards),
        );
        Self {
            pots,
            next_id: FundingPotId::REWARDS.0 + 1,
            inflow: HashMap::new(),
        }
    }

    /// The id the next opened pot will receive.
    pub fn next_id(&self) -> FundingPotId {
        FundingPotId(self.next_id)
    }

    /// Open a new, empty pot for `owner`.
    pub fn open_pot(&mut self, owner: PotOwner) -> FundingPotId {
        let id = FundingPotId(self.next_id);
        self.next_id += 1;
        self.pots.insert(id, FundingPot::new(id, owner));
        debug!(pot = %id, owner = ?owner, "Funding pot opened");
        id
    }

    pub fn get(&self, pot: FundingPotId) -> Result<&FundingPot, FundingError> {
        self.pots.get(&pot).ok_or(FundingError::PotNotFound(pot))
    }

    pub fn owner_of(&self, pot: FundingPotId) -> Result<PotOwner, FundingError> {
        self.get(pot).map(|p| p.owner)
    }

    pub fn balance(&self, pot: FundingPotId, token: &TokenId) -> Result<Amount, FundingError> {
        self.get(pot).map(|p| p.balance(token))
    }

    pub fn pots(&self) -> impl Iterator<Item = &FundingPot> {
        self.pots.values()
    }

    /// Validate a deposit without applying it.
    pub fn check_deposit(
        &self,
        pot: FundingPotId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<(Amount, Amount), FundingError> {
        let overflow = || FundingError::Overflow {
            pot,
            token: token.clone(),
        };
        let new_balance = self
            .balance(pot, token)?
            .checked_add(amount)
            .ok_or_else(overflow)?;
        let new_inflow = self
            .inflow
            .get(token)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(overflow)?;
        Ok((new_balance, new_inflow))
    }

    /// Credit tokens entering the colony to `pot`.
    pub fn deposit(
        &mut self,
        pot: FundingPotId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<(), FundingError> {
        let (new_balance, new_inflow) = self.check_deposit(pot, token, amount)?;

        self.set_balance(pot, token, new_balance);
        self.inflow.insert(token.clone(), new_inflow);

        info!(pot = %pot, token = %token, amount = amount, "Funds deposited");
        Ok(())
    }

    /// Validate a move without applying it.
    pub fn check_move(
        &self,
        from: FundingPotId,
        to: FundingPotId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<(), FundingError> {
        if from.is_rewards() || to.is_rewards() {
            return Err(FundingError::RewardsPotLocked);
        }
        if from == to {
            return Err(FundingError::SamePot(from));
        }

        let available = self.balance(from, token)?;
        let destination = self.balance(to, token)?;

        if available < amount {
            return Err(FundingError::InsufficientBalance {
                pot: from,
                token: token.clone(),
                required: amount,
                available,
            });
        }
        if destination.checked_add(amount).is_none() {
            return Err(FundingError::Overflow {
                pot: to,
                token: token.clone(),
            });
        }
        Ok(())
    }

    /// Move `amount` of `token` between two pots. All-or-nothing.
    pub fn move_funds(
        &mut self,
        from: FundingPotId,
        to: FundingPotId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<(), FundingError> {
        self.check_move(from, to, token, amount)?;

        let from_balance = self.balance(from, token)? - amount;
        let to_balance = self.balance(to, token)? + amount;
        self.set_balance(from, token, from_balance);
        self.set_balance(to, token, to_balance);

        info!(from = %from, to = %to, token = %token, amount = amount, "Funds moved between pots");
        Ok(())
    }

    /// Sum of `token` across every pot.
    pub fn total_balance(&self, token: &TokenId) -> Amount {
        self.pots.values().map(|p| p.balance(token)).sum()
    }

    /// Total ever deposited for `token`.
    pub fn total_inflow(&self, token: &TokenId) -> Amount {
        self.inflow.get(token).copied().unwrap_or(0)
    }

    fn set_balance(&mut self, pot: FundingPotId, token: &TokenId, amount: Amount) {
        if let Some(p) = self.pots.get_mut(&pot) {
            p.balances.insert(token.clone(), amount);
        }
    }
}

impl Default for FundingPotLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_types::WAD;
    use proptest::prelude::*;

    fn token() -> TokenId {
        TokenId::new("CLNY")
    }

    fn ledger_with_two_domains() -> (FundingPotLedger, FundingPotId, FundingPotId) {
        let mut ledger = FundingPotLedger::new();
        let a = ledger.open_pot(PotOwner::Domain(DomainId(1)));
        let b = ledger.open_pot(PotOwner::Domain(DomainId(2)));
        (ledger, a, b)
    }

    #[test]
    fn rewards_pot_exists_at_construction() {
        let ledger = FundingPotLedger::new();
        assert_eq!(ledger.owner_of(FundingPotId::REWARDS).unwrap(), PotOwner::Rewards);
        assert_eq!(ledger.next_id(), FundingPotId(1));
    }

    #[test]
    fn pots_are_numbered_sequentially() {
        let (mut ledger, a, b) = ledger_with_two_domains();
        let c = ledger.open_pot(PotOwner::Task(TaskId(1)));
        assert_eq!((a, b, c), (FundingPotId(1), FundingPotId(2), FundingPotId(3)));
        assert_eq!(ledger.owner_of(c).unwrap(), PotOwner::Task(TaskId(1)));
    }

    #[test]
    fn move_between_pots() {
        let (mut ledger, a, b) = ledger_with_two_domains();
        ledger.deposit(a, &token(), 3 * WAD).unwrap();

        ledger.move_funds(a, b, &token(), WAD).unwrap();

        assert_eq!(ledger.balance(a, &token()).unwrap(), 2 * WAD);
        assert_eq!(ledger.balance(b, &token()).unwrap(), WAD);
    }

    #[test]
    fn insufficient_balance_leaves_state_unchanged() {
        let (mut ledger, a, b) = ledger_with_two_domains();
        ledger.deposit(a, &token(), 10).unwrap();

        let err = ledger.move_funds(a, b, &token(), 11).unwrap_err();
        assert!(matches!(
            err,
            FundingError::InsufficientBalance { required: 11, available: 10, .. }
        ));
        assert_eq!(ledger.balance(a, &token()).unwrap(), 10);
        assert_eq!(ledger.balance(b, &token()).unwrap(), 0);
    }

    #[test]
    fn rewards_pot_is_locked_for_moves() {
        let (mut ledger, a, _) = ledger_with_two_domains();
        ledger.deposit(FundingPotId::REWARDS, &token(), 10).unwrap();
        assert_eq!(
            ledger.move_funds(FundingPotId::REWARDS, a, &token(), 1),
            Err(FundingError::RewardsPotLocked)
        );
        assert_eq!(
            ledger.move_funds(a, FundingPotId::REWARDS, &token(), 0),
            Err(FundingError::RewardsPotLocked)
        );
    }

    #[test]
    fn same_pot_and_missing_pot_are_rejected() {
        let (mut ledger, a, _) = ledger_with_two_domains();
        assert_eq!(ledger.move_funds(a, a, &token(), 0), Err(FundingError::SamePot(a)));
        assert_eq!(
            ledger.move_funds(a, FundingPotId(42), &token(), 0),
            Err(FundingError::PotNotFound(FundingPotId(42)))
        );
    }

    #[test]
    fn deposits_accumulate_inflow() {
        let (mut ledger, a, b) = ledger_with_two_domains();
        ledger.deposit(a, &token(), 100).unwrap();
        ledger.deposit(b, &token(), 30).unwrap();
        ledger.move_funds(a, b, &token(), 40).unwrap();

        assert_eq!(ledger.total_inflow(&token()), 130);
        assert_eq!(ledger.total_balance(&token()), 130);
        assert_eq!(ledger.total_inflow(&TokenId::new("ETH")), 0);
    }

    #[test]
    fn tokens_are_tracked_independently() {
        let (mut ledger, a, b) = ledger_with_two_domains();
        let other = TokenId::new("ETH");
        ledger.deposit(a, &token(), 5).unwrap();
        ledger.deposit(a, &other, 9).unwrap();

        ledger.move_funds(a, b, &other, 4).unwrap();

        assert_eq!(ledger.balance(a, &token()).unwrap(), 5);
        assert_eq!(ledger.balance(b, &other).unwrap(), 4);
        assert_eq!(ledger.total_balance(&other), 9);
    }

    proptest! {
        #[test]
        fn moves_conserve_total(
            seed in 0u128..1_000_000,
            moves in prop::collection::vec((0usize..4, 0usize..4, 0u128..500_000), 0..40),
        ) {
            let mut ledger = FundingPotLedger::new();
            let pots: Vec<_> = (1..=4)
                .map(|d| ledger.open_pot(PotOwner::Domain(DomainId(d))))
                .collect();
            ledger.deposit(pots[0], &token(), seed).unwrap();

            for (from, to, amount) in moves {
                let _ = ledger.move_funds(pots[from], pots[to], &token(), amount);
                prop_assert_eq!(ledger.total_balance(&token()), ledger.total_inflow(&token()));
            }
            prop_assert_eq!(ledger.total_balance(&token()), seed);
        }
    }
}
