/// JWT Claims structure
///
/// Payload of an access token: the identity's username and roles plus the
/// registered claims (RFC 7519) the validator checks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// One entry per assigned role
    pub roles: Vec<String>,
    /// Unique token identifier
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_name` valid for `lifetime` starting at `issued_at`
    ///
    /// # Errors
    /// `AppError::Internal` if the expiry falls outside the representable
    /// date range.
    pub fn new(
        user_name: &str,
        roles: &[String],
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, AppError> {
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?;

        Ok(Self {
            sub: user_name.to_string(),
            roles: roles.to_vec(),
            jti: Uuid::new_v4().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    pub fn user_name(&self) -> &str {
        &self.sub
    }
}
