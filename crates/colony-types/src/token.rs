use serde::{Deserialize, Serialize};

/// Token amounts in the smallest unit.
pub type Amount = u128;

/// One whole token at 18 decimals.
pub const WAD: Amount = 1_000_000_000_000_000_000;

/// Token identifier (symbol or contract reference).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
