//! Login, registration and per-request session checks.

use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cookies::SessionCarrier;
use super::password::{PasswordError, PasswordHasher};
use super::token::{TokenError, TokenGenerator};
use super::validation::{validate_new_user, FieldError};
use crate::config::Config;
use crate::db::{NewUser, Token, User};
use crate::store::{StoreError, TokenStore, UserStore};

/// An authenticated request: the presented token and the user who owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Token,
    pub user: User,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("user not found")]
    UserNotFound,
    /// Wrong password, or the stored digest could not be parsed
    #[error("invalid credentials")]
    BadCredentials,
    #[error(transparent)]
    TokenGenerationFailed(#[from] TokenError),
    #[error("session persistence failed: {0}")]
    PersistenceFailed(#[source] StoreError),
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid registration: {} field(s) rejected", .0.len())]
    Invalid(Vec<FieldError>),
    #[error("email is already registered")]
    EmailTaken,
    #[error("password hashing failed: {0}")]
    Hashing(#[source] PasswordError),
    #[error("user persistence failed: {0}")]
    Persistence(#[source] StoreError),
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    hasher: PasswordHasher,
    generator: TokenGenerator,
    carrier: SessionCarrier,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        hasher: PasswordHasher,
        carrier: SessionCarrier,
    ) -> Self {
        Self {
            users,
            tokens,
            generator: TokenGenerator::new(hasher.clone()),
            hasher,
            carrier,
        }
    }

    pub fn from_config(
        config: &Config,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::new(&config.password)?;
        let carrier = SessionCarrier::new(&config.session);
        Ok(Self::new(users, tokens, hasher, carrier))
    }

    /// Create a user after validating the input and hashing the password.
    /// Does not start a session.
    pub async fn register(&self, new_user: NewUser) -> Result<User, RegisterError> {
        let errors = validate_new_user(&new_user);
        if !errors.is_empty() {
            return Err(RegisterError::Invalid(errors));
        }

        let existing = self
            .users
            .get_by_email(&new_user.email)
            .await
            .map_err(RegisterError::Persistence)?;
        if existing.is_some() {
            return Err(RegisterError::EmailTaken);
        }

        let password_hash = self
            .hasher
            .hash(&new_user.password)
            .map_err(RegisterError::Hashing)?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: new_user.email,
            name: new_user.name,
            surname: new_user.surname,
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        // A concurrent registration can still win the race on the unique email
        self.users.insert(&user).await.map_err(|e| match e {
            StoreError::Conflict => RegisterError::EmailTaken,
            other => RegisterError::Persistence(other),
        })?;

        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Verify credentials, issue and persist a token, and return the jar with
    /// both session cookies added. On any failure no cookie is written.
    pub async fn login(
        &self,
        jar: CookieJar,
        email: &str,
        password: &str,
    ) -> Result<(CookieJar, Session), LoginError> {
        let user = self
            .users
            .get_by_email(email)
            .await
            .map_err(LoginError::PersistenceFailed)?
            .ok_or(LoginError::UserNotFound)?;

        if let Err(e) = self.hasher.verify(&user.password_hash, password) {
            if let PasswordError::Malformed(reason) = &e {
                warn!(user_id = %user.id, %reason, "Stored password digest is malformed");
            }
            return Err(LoginError::BadCredentials);
        }

        let issued_at = Utc::now();
        let token = Token::new(
            user.id.clone(),
            self.generator.generate_at(&user.id, issued_at)?,
        );

        self.tokens
            .save(&token)
            .await
            .map_err(LoginError::PersistenceFailed)?;

        let jar = self.carrier.write(jar, &token, issued_at);
        info!(user_id = %user.id, "User logged in");

        Ok((jar, Session { token, user }))
    }

    /// Resolve the session carried by the request cookies.
    ///
    /// Every failure (missing cookies, unknown token, vanished user, store
    /// error) yields `None` without telling the caller which step failed.
    pub async fn check_auth(&self, jar: &CookieJar) -> Option<Session> {
        let token = self.carrier.read(jar)?;

        match self.tokens.exists(&token.user_id, &token.token).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = %token.user_id, "Session token not found");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Token lookup failed");
                return None;
            }
        }

        match self.users.get_by_id(&token.user_id).await {
            Ok(Some(user)) => Some(Session { token, user }),
            Ok(None) => {
                debug!(user_id = %token.user_id, "Session owner no longer exists");
                None
            }
            Err(e) => {
                warn!(error = %e, "User lookup failed");
                None
            }
        }
    }

    pub async fn check_headers(&self, headers: &HeaderMap) -> Option<Session> {
        self.check_auth(&CookieJar::from_headers(headers)).await
    }
}
