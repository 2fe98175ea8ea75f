//! Authentication service.
//!
//! Orchestrates registration, credential verification, token issuance and
//! refresh-token rotation over a [`UserStore`]. The verified identity is
//! always passed explicitly from verification to issuance.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use crate::auth::credentials::verify_credentials;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::hash_password;
use crate::auth::refresh_token::{generate_refresh_token, refresh_token_expiry};
use crate::error::{AppError, AuthError, DatabaseError, FieldErrors};
use crate::store::{Identity, NewIdentity, UserStore};
use crate::validators::{
    check_email, check_password, check_person_name, check_user_name, required, resolve_roles,
};

/// Access and refresh token returned to the client.
///
/// Also the body of a refresh request; missing and `null` fields
/// deserialize to empty strings so they fail the refresh input guard like
/// any other bad value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub access_token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub refresh_token: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Registration request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForRegistration {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Shared by all workers through `web::Data`
#[derive(Clone)]
pub struct AuthenticationService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthenticationService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Validate and create a new identity.
    ///
    /// # Errors
    /// `AppError::Registration` with one entry per offending field,
    /// including a taken username or email.
    pub async fn register_user(&self, registration: UserForRegistration) -> Result<Identity, AppError> {
        let mut errors = FieldErrors::new();

        let first_name = required(&mut errors, "firstName", "FirstName", registration.first_name.as_deref());
        let last_name = required(&mut errors, "lastName", "LastName", registration.last_name.as_deref());
        let user_name = required(&mut errors, "userName", "Username", registration.user_name.as_deref());
        let email = required(&mut errors, "email", "Email", registration.email.as_deref());
        // passwords are taken verbatim, surrounding whitespace included
        let password = match registration.password.as_deref() {
            Some(p) if !p.is_empty() => Some(p),
            _ => {
                errors.add("password", "Password is required");
                None
            }
        };

        if let Some(first_name) = first_name {
            check_person_name(&mut errors, "firstName", "FirstName", first_name);
        }
        if let Some(last_name) = last_name {
            check_person_name(&mut errors, "lastName", "LastName", last_name);
        }
        if let Some(user_name) = user_name {
            check_user_name(&mut errors, user_name);
        }
        if let Some(email) = email {
            check_email(&mut errors, email);
        }
        if let Some(password) = password {
            check_password(&mut errors, password);
        }
        let roles = resolve_roles(&mut errors, registration.roles.as_deref());

        let (Some(first_name), Some(last_name), Some(user_name), Some(email), Some(password)) =
            (first_name, last_name, user_name, email, password)
        else {
            return Err(errors.into());
        };
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let new_identity = NewIdentity {
            user_name: user_name.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            roles,
        };

        match self.store.create(new_identity).await {
            Ok(identity) => {
                tracing::info!(
                    user_id = %identity.id,
                    user_name = %identity.user_name,
                    roles = ?identity.roles,
                    "User registered"
                );
                Ok(identity)
            }
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(field))) => {
                let mut errors = FieldErrors::new();
                if field == "email" {
                    errors.add("email", format!("Email '{}' is already taken.", email));
                } else {
                    errors.add("userName", format!("Username '{}' is already taken.", user_name));
                }
                Err(errors.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Credential check; `Some` carries the identity to issue tokens for.
    pub async fn validate_user(&self, user_name: &str, password: &str) -> Result<Option<Identity>, AppError> {
        verify_credentials(self.store.as_ref(), user_name, password).await
    }

    /// Mint an access/refresh pair for a verified identity.
    ///
    /// The new refresh token is assigned to `identity`. With `populate_exp`
    /// its expiry is set to 20 days out and both are persisted; otherwise
    /// nothing is written to the store.
    pub async fn create_token(&self, identity: &mut Identity, populate_exp: bool) -> Result<TokenPair, AppError> {
        self.issue(identity, populate_exp, None).await
    }

    /// Rotate a token pair.
    ///
    /// Every rejection is `AuthError::RefreshBadRequest`; the reason is
    /// only logged.
    pub async fn refresh_token(&self, request: TokenPair) -> Result<TokenPair, AppError> {
        if request.access_token.is_empty() || request.refresh_token.is_empty() {
            tracing::warn!("Refresh rejected: empty access or refresh token");
            return Err(AuthError::RefreshBadRequest.into());
        }

        let claims = self
            .keys
            .parse_expired_token(&request.access_token)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh rejected: access token did not parse");
                AppError::Auth(AuthError::RefreshBadRequest)
            })?;

        let Some(mut identity) = self.store.find_by_user_name(claims.user_name()).await? else {
            tracing::warn!(user_name = %claims.sub, "Refresh rejected: unknown user");
            return Err(AuthError::RefreshBadRequest.into());
        };

        if identity.refresh_token.as_deref() != Some(request.refresh_token.as_str()) {
            tracing::warn!(user_name = %identity.user_name, "Refresh rejected: refresh token mismatch");
            return Err(AuthError::RefreshBadRequest.into());
        }

        let now = Utc::now();
        if !identity.refresh_token_expiry.is_some_and(|expiry| expiry > now) {
            tracing::warn!(
                user_name = %identity.user_name,
                expiry = ?identity.refresh_token_expiry,
                "Refresh rejected: refresh token expired"
            );
            return Err(AuthError::RefreshBadRequest.into());
        }

        let pair = self
            .issue(&mut identity, true, Some(&request.refresh_token))
            .await?;

        tracing::info!(user_name = %identity.user_name, "Token refreshed successfully");
        Ok(pair)
    }

    async fn issue(
        &self,
        identity: &mut Identity,
        populate_exp: bool,
        replacing: Option<&str>,
    ) -> Result<TokenPair, AppError> {
        let access_token = self
            .keys
            .generate_access_token(&identity.user_name, &identity.roles)?;
        let refresh_token = generate_refresh_token();
        identity.refresh_token = Some(refresh_token.clone());

        if populate_exp {
            let expires_at = refresh_token_expiry(Utc::now());
            identity.refresh_token_expiry = Some(expires_at);

            match replacing {
                None => {
                    self.store
                        .save_refresh_token(&identity.user_name, &refresh_token, expires_at)
                        .await?
                }
                Some(expected) => {
                    let swapped = self
                        .store
                        .swap_refresh_token(&identity.user_name, expected, &refresh_token, expires_at)
                        .await?;
                    if !swapped {
                        tracing::warn!(
                            user_name = %identity.user_name,
                            "Refresh rejected: refresh token rotated concurrently"
                        );
                        return Err(AuthError::RefreshBadRequest.into());
                    }
                }
            }
        }

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
