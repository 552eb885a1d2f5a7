use colony_types::ActorId;
use ed25519_dalek::SigningKey;

const SEED_CONTEXT: &[u8] = b"colony-signing-seed:";

/// Deterministic Ed25519 key for a named actor.
///
/// Only for bootstrapping and scripted runs; the seed is public.
pub fn signing_key_from_label(label: &str) -> SigningKey {
    let mut hasher = blake3::Hasher::new();
    hasher.update(SEED_CONTEXT);
    hasher.update(label.as_bytes());
    SigningKey::from_bytes(hasher.finalize().as_bytes())
}

/// The actor id bound to `key`.
pub fn actor_for_key(key: &SigningKey) -> ActorId {
    ActorId::from_verifying_key(&key.verifying_key().to_bytes())
}

/// Key and actor id for a named actor.
pub fn seeded_actor(label: &str) -> (SigningKey, ActorId) {
    let key = signing_key_from_label(label);
    let actor = actor_for_key(&key);
    (key, actor)
}
