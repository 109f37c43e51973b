//! Credential verification and the session token lifecycle.
//!
//! Login runs email lookup, password verification, token generation,
//! persistence and cookie writing, in that order; cookies are only written
//! when every step succeeded. Request checks read the cookie pair back,
//! confirm the token in the store and resolve its owner.

mod cookies;
mod password;
mod service;
mod token;
mod validation;

pub use cookies::SessionCarrier;
pub use password::{PasswordError, PasswordHasher};
pub use service::{AuthService, LoginError, RegisterError, Session};
pub use token::{TokenError, TokenGenerator, SEED_LEN};
pub use validation::{validate_email, validate_new_user, FieldError};

#[cfg(test)]
pub(crate) use password::test_hasher;
