//! # colony-authority
//!
//! Decides whether an actor may perform a privileged action in a domain.
//!
//! Every privileged call names three things besides the action: the domain
//! where the caller claims a role (the permission domain), the domain the
//! action targets, and the position of the target in the permission domain's
//! descendant list (the child skill index). The engine checks that the path
//! is real, then consults the capability table in [`Action`]:
//!
//! 1. Root held at the root domain authorizes everything.
//! 2. A direct role for the action held at the permission domain authorizes
//!    the permission domain and every descendant.
//! 3. Subdomain-scoped authority (Architecture stored at the permission
//!    domain) authorizes role changes in direct children only.
//!
//! Role inheritance is computed here over the stored bits of
//! `colony-roles`; nothing derived is ever written back.

pub mod action;
pub mod engine;
pub mod error;

pub use action::Action;
pub use engine::{Authorization, AuthorizationEngine, Grant, Scope};
pub use error::AuthError;
