//! # colony-domains
//!
//! The domain tree partitions a colony's authority and funds. The root domain
//! (`DomainId::ROOT`) has no parent; every other domain has exactly one parent
//! that existed when it was created.
//!
//! Structure and policy are separate: [`DomainTree`] is a general tree, and
//! whether a new domain may hang below a given parent is decided by a
//! [`DomainPolicy`] the colony is configured with.
//!
//! Each domain keeps the ordered list of all its descendants in creation
//! order. Callers address a target domain below a permission domain by its
//! position in that list (the child skill index).

pub mod error;
pub mod policy;
pub mod tree;

pub use error::DomainError;
pub use policy::{DomainPolicy, MaxDepth, RootChildrenOnly};
pub use tree::{Domain, DomainTree};
