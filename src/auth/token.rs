use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use thiserror::Error;

use super::password::{PasswordError, PasswordHasher};

/// Length of the random alphanumeric seed that gets hashed into each token
pub const SEED_LEN: usize = 20;

#[derive(Debug, Error)]
#[error("token generation failed: {0}")]
pub struct TokenError(#[from] PasswordError);

/// Issues session token strings of the form
/// `<user id><unix timestamp><salted hash of a random seed>`.
///
/// The user id prefix is not signed; it only lets the token be stored and
/// looked up next to its owner.
#[derive(Clone)]
pub struct TokenGenerator {
    hasher: PasswordHasher,
}

impl TokenGenerator {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self { hasher }
    }

    pub fn generate(&self, user_id: &str) -> Result<String, TokenError> {
        self.generate_at(user_id, Utc::now())
    }

    pub fn generate_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let digest = self.hasher.hash(random_seed(SEED_LEN))?;
        Ok(format!("{}{}{}", user_id, now.timestamp(), digest))
    }
}

/// Draw `len` characters uniformly from `[A-Za-z0-9]`
fn random_seed(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
