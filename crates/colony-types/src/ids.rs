use serde::{Deserialize, Serialize};

/// Strong typed ids used throughout the colony.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundingPotId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl DomainId {
    /// The root domain of every colony.
    pub const ROOT: DomainId = DomainId(1);

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl FundingPotId {
    /// Pot 0 collects the colony's reward share and is never a move endpoint.
    pub const REWARDS: FundingPotId = FundingPotId(0);

    pub fn is_rewards(&self) -> bool {
        *self == Self::REWARDS
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "domain:{}", self.0)
    }
}

impl std::fmt::Display for FundingPotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pot:{}", self.0)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task:{}", self.0)
    }
}
