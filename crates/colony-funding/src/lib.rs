//! # colony-funding
//!
//! Funding pots hold a colony's balances. Every domain and every task owns
//! exactly one pot; pot 0 is the colony rewards pot.
//!
//! Tokens enter only through [`FundingPotLedger::deposit`]. Moves between pots
//! never create or destroy value, so for every token the sum of pot balances
//! equals total inflow.

pub mod error;
pub mod ledger;

pub use error::FundingError;
pub use ledger::{FundingPot, FundingPotLedger, PotOwner};
