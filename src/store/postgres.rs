use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{Identity, NewIdentity, UserStore};
use crate::error::{AppError, DatabaseError};

/// Postgres-backed user store over the `users` table
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn identity_from_row(row: &sqlx::postgres::PgRow) -> Result<Identity, sqlx::Error> {
    Ok(Identity {
        id: row.try_get::<Uuid, _>("id")?,
        user_name: row.try_get("user_name")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        roles: row.try_get::<Vec<String>, _>("roles")?,
        refresh_token: row.try_get("refresh_token")?,
        refresh_token_expiry: row.try_get("refresh_token_expiry")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Map the unique index names from the migration onto request field names
fn duplicate_field(constraint: &str) -> &'static str {
    if constraint.contains("email") {
        "email"
    } else {
        "userName"
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<Identity>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_name, first_name, last_name, email, password_hash, roles,
                   refresh_token, refresh_token_expiry, created_at
            FROM users
            WHERE lower(user_name) = lower($1)
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(identity_from_row)
            .transpose()
            .map_err(AppError::from)
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, AppError> {
        let identity = Identity::from_new(identity);

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, user_name, first_name, last_name, email, password_hash, roles, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(identity.id)
        .bind(&identity.user_name)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.roles)
        .bind(identity.created_at)
        .execute(&self.pool)
        .await;

        match result.map_err(AppError::from) {
            Ok(_) => Ok(identity),
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(constraint))) => {
                Err(DatabaseError::UniqueConstraintViolation(
                    duplicate_field(&constraint).to_string(),
                )
                .into())
            }
            Err(e) => Err(e),
        }
    }

    async fn save_refresh_token(
        &self,
        user_name: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $1, refresh_token_expiry = $2
            WHERE lower(user_name) = lower($3)
            "#,
        )
        .bind(refresh_token)
        .bind(expires_at)
        .bind(user_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", user_name)).into());
        }
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_name: &str,
        expected: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $1, refresh_token_expiry = $2
            WHERE lower(user_name) = lower($3) AND refresh_token = $4
            "#,
        )
        .bind(refresh_token)
        .bind(expires_at)
        .bind(user_name)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
