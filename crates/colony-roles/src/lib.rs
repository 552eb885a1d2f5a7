//! # colony-roles
//!
//! Stored role bits, keyed by `(actor, domain)`.
//!
//! The store is a plain lookup table. It does not know about inheritance:
//! Root overriding everything and Architecture implying subdomain authority
//! are derived by `colony-authority` on top of these bits. Writes are
//! unconditional here and only reach the store after the kernel has
//! authorized them.

pub mod error;
pub mod store;

pub use error::RoleError;
pub use store::{RoleEntry, RoleStore};
