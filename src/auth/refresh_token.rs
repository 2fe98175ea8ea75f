/// Refresh Token Generation
///
/// Refresh tokens are opaque: 32 bytes from the operating system's CSPRNG,
/// standard base64 encoded. One token is active per identity and it lives
/// for a fixed window after issuance.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

const REFRESH_TOKEN_BYTES: usize = 32;
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 20;

/// Generate a new cryptographically secure refresh token
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::STANDARD.encode(bytes)
}

/// Absolute expiry for a refresh token issued at `now`
pub fn refresh_token_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)
}
