use async_trait::async_trait;
use dashmap::DashSet;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{StoreError, TokenStore, UserStore};
use crate::db::{Token, User};

/// In-process store. Users are keyed by id; the email uniqueness check and the
/// insert happen under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    tokens: DashSet<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn remove_user(&self, id: &str) -> Option<User> {
        self.users.write().remove(id)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write();
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn save(&self, token: &Token) -> Result<(), StoreError> {
        if self
            .tokens
            .insert((token.user_id.clone(), token.token.clone()))
        {
            Ok(())
        } else {
            Err(StoreError::Conflict)
        }
    }

    async fn exists(&self, user_id: &str, token: &str) -> Result<bool, StoreError> {
        Ok(self
            .tokens
            .contains(&(user_id.to_string(), token.to_string())))
    }
}
