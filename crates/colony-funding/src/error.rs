use colony_types::{Amount, FundingPotId, TokenId};
use thiserror::Error;

/// Errors from the funding pot ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundingError {
    #[error("funding pot not found: {0}")]
    PotNotFound(FundingPotId),

    #[error("source and destination are the same pot: {0}")]
    SamePot(FundingPotId),

    #[error("the rewards pot cannot be a move source or destination")]
    RewardsPotLocked,

    #[error("insufficient balance in {pot}: required {required} of {token}, available {available}")]
    InsufficientBalance {
        pot: FundingPotId,
        token: TokenId,
        required: Amount,
        available: Amount,
    },

    #[error("balance overflow in {pot} for {token}")]
    Overflow { pot: FundingPotId, token: TokenId },
}
