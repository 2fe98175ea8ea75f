/// JWT Token Generation and Validation
///
/// Signs access tokens with HS256 and verifies them on two paths: full
/// validation for protected routes, and validation without the lifetime
/// check for the refresh flow.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signing material and token parameters derived from [`JwtSettings`]
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl JwtKeys {
    /// Build keys from settings.
    ///
    /// # Errors
    /// Returns a config error if the secret is missing or shorter than
    /// 256 bits, or the token lifetime is out of range; the service must
    /// not start in that case.
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        Ok(Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.valid_issuer.clone(),
            audience: settings.valid_audience.clone(),
            lifetime: Duration::minutes(settings.expires),
        })
    }

    /// Generate a new access token for a user
    ///
    /// # Errors
    /// Returns error if token encoding fails
    pub fn generate_access_token(&self, user_name: &str, roles: &[String]) -> Result<String, AppError> {
        self.generate_access_token_at(user_name, roles, Utc::now())
    }

    /// Same as [`generate_access_token`](Self::generate_access_token) with an
    /// explicit issue time.
    pub fn generate_access_token_at(
        &self,
        user_name: &str,
        roles: &[String],
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims::new(
            user_name,
            roles,
            &self.issuer,
            &self.audience,
            issued_at,
            self.lifetime,
        )?;

        encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Validate signature, algorithm, issuer, audience and expiry
    ///
    /// # Errors
    /// `AuthError::TokenExpired` for an otherwise valid but expired token,
    /// `AuthError::TokenInvalid` for anything else.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(token, true)
    }

    /// Validate everything except expiry and return the claims.
    ///
    /// Only the refresh flow uses this: it needs the identity out of an
    /// access token that has already expired.
    ///
    /// # Errors
    /// `AuthError::TokenInvalid` on malformed tokens, bad signatures,
    /// issuer/audience mismatch, or any algorithm other than HS256.
    pub fn parse_expired_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(token, false)
    }

    fn decode(&self, token: &str, validate_lifetime: bool) -> Result<Claims, AppError> {
        let header = decode_header(token).map_err(|e| {
            tracing::warn!("Malformed JWT header: {}", e);
            AppError::Auth(AuthError::TokenInvalid)
        })?;

        if header.alg != ALGORITHM {
            tracing::warn!(algorithm = ?header.alg, "Rejected JWT with unexpected signing algorithm");
            return Err(AppError::Auth(AuthError::TokenInvalid));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = 0;
        validation.validate_exp = validate_lifetime;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("JWT validation error: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AppError::Auth(AuthError::TokenExpired),
                    _ => AppError::Auth(AuthError::TokenInvalid),
                }
            })
    }
}
