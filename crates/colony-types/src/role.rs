use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Colony-level role tags.
///
/// The discriminants are the bit positions used by [`RoleSet`] and match the
/// numbering operators already use (Recovery is role 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Role {
    Recovery = 0,
    Root = 1,
    Arbitration = 2,
    Architecture = 3,
    ArchitectureSubdomain = 4,
    Funding = 5,
    Administration = 6,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Recovery,
        Role::Root,
        Role::Arbitration,
        Role::Architecture,
        Role::ArchitectureSubdomain,
        Role::Funding,
        Role::Administration,
    ];

    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Roles that only carry meaning when held at the root domain.
    pub fn is_root_scoped(self) -> bool {
        matches!(self, Role::Root | Role::Recovery)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Recovery => "recovery",
            Role::Root => "root",
            Role::Arbitration => "arbitration",
            Role::Architecture => "architecture",
            Role::ArchitectureSubdomain => "architecture-subdomain",
            Role::Funding => "funding",
            Role::Administration => "administration",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// A fixed-size set of [`Role`] tags stored as a bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(u8);

impl RoleSet {
    const MASK: u8 = 0b0111_1111;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from raw bits, dropping bits that name no role.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn with(mut self, role: Role) -> Self {
        self.insert(role);
        self
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn remove(&mut self, role: Role) {
        self.0 &= !role.bit();
    }

    pub fn set(&mut self, role: Role, enabled: bool) {
        if enabled {
            self.insert(role);
        } else {
            self.remove(role);
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the contained roles in discriminant order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(RoleSet::empty(), RoleSet::with)
    }
}

impl std::fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(Role::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Task-scoped roles reassigned through signed approvals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskRole {
    Manager,
    Evaluator,
    Worker,
}

impl std::fmt::Display for TaskRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskRole::Manager => f.write_str("manager"),
            TaskRole::Evaluator => f.write_str("evaluator"),
            TaskRole::Worker => f.write_str("worker"),
        }
    }
}
