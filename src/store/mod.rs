/// User Store
///
/// The narrow persistence capability the authentication core depends on:
/// lookup by username, creation at registration, and the two ways a
/// refresh token gets written (unconditional on login, compare-and-swap
/// on rotation).

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

/// A registered user record
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub refresh_token: Option<String>,
    /// Only meaningful while `refresh_token` is set
    pub refresh_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A validated registration, password already hashed
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn from_new(new: NewIdentity) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_name: new.user_name,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            roles: new.roles,
            refresh_token: None,
            refresh_token_expiry: None,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-insensitive lookup by username
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<Identity>, AppError>;

    /// Insert a new identity.
    ///
    /// # Errors
    /// `DatabaseError::UniqueConstraintViolation` naming `userName` or
    /// `email` when either is already taken (case-insensitive).
    async fn create(&self, identity: NewIdentity) -> Result<Identity, AppError>;

    /// Overwrite the refresh token and its expiry unconditionally
    async fn save_refresh_token(
        &self,
        user_name: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Replace the refresh token only if the stored one still equals
    /// `expected`. Returns false when another writer got there first.
    async fn swap_refresh_token(
        &self,
        user_name: &str,
        expected: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}
