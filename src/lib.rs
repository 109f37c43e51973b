pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod store;

pub use db::DbPool;

use anyhow::Result;
use config::Config;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::store::SqliteStore;

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config, auth: AuthService) -> Self {
        Self { config, auth }
    }

    /// Build the state for a SQLite-backed deployment
    pub fn with_pool(config: Config, db: DbPool) -> Result<Self> {
        let store = Arc::new(SqliteStore::new(db));
        let auth = AuthService::from_config(&config, store.clone(), store)?;
        Ok(Self::new(config, auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use axum_extra::extract::CookieJar;

    #[tokio::test]
    async fn test_sqlite_backed_session_flow() {
        let mut config = Config::default();
        config.password.memory_kib = 8;
        config.password.iterations = 1;

        let state = AppState::with_pool(config, db::memory_pool().await).unwrap();
        let user = state
            .auth
            .register(NewUser {
                email: "a@b.com".to_string(),
                name: "Ada".to_string(),
                surname: "Lovelace".to_string(),
                password: "secret".to_string(),
                repeat_password: "secret".to_string(),
            })
            .await
            .unwrap();

        let (jar, _) = state
            .auth
            .login(CookieJar::new(), "a@b.com", "secret")
            .await
            .unwrap();
        let session = state.auth.check_auth(&jar).await.unwrap();
        assert_eq!(session.user, user);
    }
}
