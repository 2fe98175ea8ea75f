use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Identity, NewIdentity, UserStore};
use crate::error::{AppError, DatabaseError};

/// Process-local user store keyed by lowercased username.
///
/// Used by the test suites and when no database is configured.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, Identity>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a fully-formed identity in place, replacing any previous one.
    pub async fn insert(&self, identity: Identity) {
        let key = normalize(&identity.user_name);
        self.users.write().await.insert(key, identity);
    }
}

fn normalize(user_name: &str) -> String {
    user_name.to_lowercase()
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<Identity>, AppError> {
        Ok(self.users.read().await.get(&normalize(user_name)).cloned())
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, AppError> {
        let mut users = self.users.write().await;
        let key = normalize(&identity.user_name);

        if users.contains_key(&key) {
            return Err(DatabaseError::UniqueConstraintViolation("userName".to_string()).into());
        }
        let email = identity.email.to_lowercase();
        if users.values().any(|u| u.email.to_lowercase() == email) {
            return Err(DatabaseError::UniqueConstraintViolation("email".to_string()).into());
        }

        let identity = Identity::from_new(identity);
        users.insert(key, identity.clone());
        Ok(identity)
    }

    async fn save_refresh_token(
        &self,
        user_name: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let identity = users
            .get_mut(&normalize(user_name))
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_name)))?;

        identity.refresh_token = Some(refresh_token.to_string());
        identity.refresh_token_expiry = Some(expires_at);
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_name: &str,
        expected: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        let Some(identity) = users.get_mut(&normalize(user_name)) else {
            return Ok(false);
        };

        if identity.refresh_token.as_deref() != Some(expected) {
            return Ok(false);
        }

        identity.refresh_token = Some(refresh_token.to_string());
        identity.refresh_token_expiry = Some(expires_at);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_identity(user_name: &str, email: &str) -> NewIdentity {
        NewIdentity {
            user_name: user_name.to_string(),
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$unused".to_string(),
            roles: vec!["User".to_string()],
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = InMemoryUserStore::new();
        store
            .create(new_identity("Juan", "juan@example.com"))
            .await
            .expect("Failed to create user");

        let found = store.find_by_user_name("JUAN").await.unwrap();
        assert_eq!(found.map(|u| u.user_name), Some("Juan".to_string()));
        assert!(store.find_by_user_name("maria").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_name_and_email_are_rejected() {
        let store = InMemoryUserStore::new();
        store
            .create(new_identity("juan", "juan@example.com"))
            .await
            .unwrap();

        let dup_name = store.create(new_identity("JUAN", "other@example.com")).await;
        assert!(matches!(
            dup_name,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(ref f))) if f == "userName"
        ));

        let dup_email = store.create(new_identity("maria", "Juan@Example.com")).await;
        assert!(matches!(
            dup_email,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(ref f))) if f == "email"
        ));
        assert!(store.find_by_user_name("maria").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_swap_only_replaces_matching_token() {
        let store = InMemoryUserStore::new();
        store
            .create(new_identity("juan", "juan@example.com"))
            .await
            .unwrap();
        let expiry = Utc::now() + Duration::days(20);
        store
            .save_refresh_token("juan", "first", expiry)
            .await
            .unwrap();

        assert!(!store
            .swap_refresh_token("juan", "stale", "second", expiry)
            .await
            .unwrap());
        assert!(store
            .swap_refresh_token("juan", "first", "second", expiry)
            .await
            .unwrap());
        // the old value no longer wins
        assert!(!store
            .swap_refresh_token("juan", "first", "third", expiry)
            .await
            .unwrap());

        let stored = store.find_by_user_name("juan").await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_save_for_unknown_user_fails() {
        let store = InMemoryUserStore::new();
        let result = store
            .save_refresh_token("ghost", "token", Utc::now())
            .await;
        assert!(result.is_err());
    }
}
