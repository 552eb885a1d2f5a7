use colony_types::ActorId;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prepended to the digest before hashing in [`SignatureMode::Prefixed`].
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"colony-signed-message:32:";

/// How an approval's signature relates to the payload digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureMode {
    /// The signer signed the digest itself.
    Direct,
    /// The signer signed BLAKE3(prefix || digest), as wallet software does.
    Prefixed,
}

impl SignatureMode {
    /// The bytes that were actually signed for `digest`.
    pub fn signed_message(self, digest: &[u8; 32]) -> [u8; 32] {
        match self {
            SignatureMode::Direct => *digest,
            SignatureMode::Prefixed => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(SIGNED_MESSAGE_PREFIX);
                hasher.update(digest);
                *hasher.finalize().as_bytes()
            }
        }
    }
}

/// One party's approval of a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedApproval {
    #[serde(with = "hex::serde")]
    pub signer_key: [u8; 32],
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    pub mode: SignatureMode,
}

impl SignedApproval {
    /// Sign `digest` with `key`.
    pub fn sign(key: &SigningKey, digest: &[u8; 32], mode: SignatureMode) -> Self {
        let signature = key.sign(&mode.signed_message(digest));
        Self {
            signer_key: key.verifying_key().to_bytes(),
            signature: signature.to_bytes().to_vec(),
            mode,
        }
    }

    /// The actor this approval claims to come from.
    pub fn claimed_signer(&self) -> ActorId {
        ActorId::from_verifying_key(&self.signer_key)
    }
}

/// Recovers the signer of an approval.
///
/// Signature schemes stay behind this trait; the protocol only sees actor ids.
pub trait SignatureVerifier: Send + Sync {
    /// The signing actor, or `None` when the approval does not verify.
    fn verify(&self, digest: &[u8; 32], approval: &SignedApproval) -> Option<ActorId>;
}

/// Ed25519 signatures over the (optionally prefixed) digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, digest: &[u8; 32], approval: &SignedApproval) -> Option<ActorId> {
        let key = VerifyingKey::from_bytes(&approval.signer_key).ok()?;
        let bytes: [u8; 64] = approval.signature.as_slice().try_into().ok()?;
        let signature = Signature::from_bytes(&bytes);

        match key.verify(&approval.mode.signed_message(digest), &signature) {
            Ok(()) => Some(approval.claimed_signer()),
            Err(_) => {
                debug!(signer = %approval.claimed_signer(), "Signature did not verify");
                None
            }
        }
    }
}
