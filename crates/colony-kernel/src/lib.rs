//! # colony-kernel
//!
//! The colony facade. Every privileged operation enters through [`Colony`],
//! which asks the authorization engine first and only then mutates the
//! domain tree, the role store, the funding pot ledger or the task registry.
//!
//! External systems (token accounting, signature checking, event delivery,
//! reputation mining) are reached through the traits in [`collaborators`].
//! [`ColonyHandle`] shares one colony across threads.

pub mod bootstrap;
pub mod collaborators;
pub mod colony;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod identity;

pub use bootstrap::{bootstrap_meta_colony, BootstrapReport};
pub use collaborators::{
    Collaborators, Ed25519Verifier, EventSink, InMemoryReputationCycle, InMemoryTokenLedger,
    RecordingEventSink, ReputationCycle, SignatureVerifier, TokenTransfer, TracingEventSink,
    TransferFailure,
};
pub use colony::{Colony, ColonySummary, MoveFunds};
pub use config::{ColonyConfig, ConfigError, DomainPolicyConfig};
pub use error::{ColonyError, ErrorKind};
pub use events::{ColonyEvent, ColonyEventKind, EventId};
pub use handle::ColonyHandle;
pub use identity::{actor_for_key, seeded_actor, signing_key_from_label};

pub use colony_authority::{Action, Scope};
pub use colony_domains::Domain;
pub use colony_funding::{FundingPot, PotOwner};
pub use colony_roles::RoleEntry;
pub use colony_tasks::{
    AssignmentPayload, RoleAssignmentArgs, RoleAssignmentFunction, SignatureMode, SignedApproval,
    TaskRoleChange, TransferState,
};
