use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::fmt;
use std::sync::Arc;

use crate::error::{AppError, Result};

/// CredentialDigest
///
/// Opaque output of the one-way hashing collaborator. Deliberately not `Serialize`:
/// digests never leave the process, and `Debug` redacts the value.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialDigest(String);

impl CredentialDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialDigest(<redacted>)")
    }
}

/// CredentialHasher
///
/// The hash/verify contract consumed by the identity store and the authentication
/// service. Swappable so tests and alternative deployments can plug in their own primitive.
pub trait CredentialHasher: Send + Sync {
    /// Produces a salted one-way digest of `secret`.
    fn hash(&self, secret: &str) -> Result<CredentialDigest>;

    /// Checks `secret` against a digest previously produced by `hash`.
    /// Malformed digests verify as `false`.
    fn verify(&self, secret: &str, digest: &CredentialDigest) -> bool;
}

/// Argon2Hasher
///
/// Argon2id (v0x13) with a random salt per digest, encoded as a PHC string.
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Builds a hasher with the given memory cost (KiB) and iteration count.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AppError::Internal(format!("invalid argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<CredentialDigest> {
        let salt = SaltString::generate(&mut OsRng);

        let digest = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("failed to hash credential: {e}")))?;

        Ok(CredentialDigest(digest.to_string()))
    }

    fn verify(&self, secret: &str, digest: &CredentialDigest) -> bool {
        let parsed = match PasswordHash::new(digest.as_str()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("stored credential digest is malformed: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

/// HasherState
///
/// The shared handle to the hashing collaborator.
pub type HasherState = Arc<dyn CredentialHasher>;
