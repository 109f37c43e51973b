//! Argon2id hashing and verification of secrets.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

use crate::config::PasswordConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("secret does not match digest")]
    Mismatch,
    #[error("malformed digest: {0}")]
    Malformed(String),
    #[error("hashing failed: {0}")]
    Hashing(String),
}

/// Salted one-way hashing. Every call to [`hash`](Self::hash) draws a fresh
/// salt, so the same secret never produces the same digest twice.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::Hashing(format!("invalid argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a secret into a PHC string (`$argon2id$v=19$...`)
    pub fn hash(&self, secret: impl AsRef<[u8]>) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(secret.as_ref(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a secret against a stored digest.
    ///
    /// The cost parameters embedded in the digest are used, not the ones this
    /// hasher was built with.
    pub fn verify(&self, digest: &str, secret: impl AsRef<[u8]>) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(digest).map_err(|e| PasswordError::Malformed(e.to_string()))?;

        match self.argon2.verify_password(secret.as_ref(), &parsed) {
            Ok(()) => Ok(()),
            Err(argon2::password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Malformed(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    // Minimal cost so debug-build tests stay fast
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}
