use serde::{Deserialize, Serialize};

/// Identity of a colony participant.
///
/// Derived by hashing identity material, never the raw key itself. Actors that
/// sign role-transfer approvals derive their id from their Ed25519 verifying
/// key; keyless actors (tests, scripted operators) derive it from a label.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(#[serde(with = "hex::serde")] [u8; 32]);

const KEY_CONTEXT: &[u8] = b"colony-actor:ed25519:";
const LABEL_CONTEXT: &[u8] = b"colony-actor:label:";

impl ActorId {
    /// Derive the actor id bound to an Ed25519 verifying key.
    pub fn from_verifying_key(key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(KEY_CONTEXT);
        hasher.update(key);
        Self(*hasher.finalize().as_bytes())
    }

    /// Derive an actor id from a human-readable label.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(LABEL_CONTEXT);
        hasher.update(label.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short display form (first 8 bytes hex).
    pub fn short_id(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor:{}", self.short_id())
    }
}

impl std::fmt::Debug for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActorId({})", self.short_id())
    }
}
