//! Core type definitions for the colony authority kernel.
//!
//! This crate holds the shared vocabulary: actor and domain identifiers,
//! the role tags and their bitmask set, task roles and token amounts.
//! No business logic lives here. Every colony crate depends on it.

pub mod actor;
pub mod ids;
pub mod role;
pub mod token;

pub use actor::ActorId;
pub use ids::{DomainId, FundingPotId, TaskId};
pub use role::{ParseRoleError, Role, RoleSet, TaskRole};
pub use token::{Amount, TokenId, WAD};
