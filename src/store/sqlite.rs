use async_trait::async_trait;

use super::{StoreError, TokenStore, UserStore};
use crate::db::{DbPool, Token, User};

/// SQLite-backed user and token store. Each call checks a connection out of the pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, surname, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for SqliteStore {
    async fn save(&self, token: &Token) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO tokens (user_id, token) VALUES (?, ?)")
            .bind(&token.user_id)
            .bind(&token.token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn exists(&self, user_id: &str, token: &str) -> Result<bool, StoreError> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM tokens WHERE user_id = ? AND token = ? LIMIT 1")
                .bind(user_id)
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let store = SqliteStore::new(memory_pool().await);
        let u = user("u1", "a@b.com");
        store.insert(&u).await.unwrap();

        assert_eq!(store.get_by_id("u1").await.unwrap(), Some(u.clone()));
        assert_eq!(store.get_by_email("a@b.com").await.unwrap(), Some(u));
        assert_eq!(store.get_by_id("u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = SqliteStore::new(memory_pool().await);
        store.insert(&user("u1", "a@b.com")).await.unwrap();

        assert!(store.get_by_email("A@B.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = SqliteStore::new(memory_pool().await);
        store.insert(&user("u1", "a@b.com")).await.unwrap();

        let err = store.insert(&user("u2", "a@b.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_token_exists_requires_both_fields() {
        let store = SqliteStore::new(memory_pool().await);
        store.save(&Token::new("u1", "t1")).await.unwrap();

        assert!(store.exists("u1", "t1").await.unwrap());
        assert!(!store.exists("u2", "t1").await.unwrap());
        assert!(!store.exists("u1", "t2").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_token_is_conflict() {
        let store = SqliteStore::new(memory_pool().await);
        store.save(&Token::new("u1", "t1")).await.unwrap();

        let err = store.save(&Token::new("u1", "t1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }
}
