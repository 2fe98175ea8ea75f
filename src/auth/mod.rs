/// Authentication module
///
/// Handles credential verification, JWT access token issuance and
/// validation, password hashing, and refresh token rotation.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::Claims;
pub use credentials::verify_credentials;
pub use jwt::JwtKeys;
pub use password::hash_password;
pub use password::password_policy_violations;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::refresh_token_expiry;
pub use refresh_token::REFRESH_TOKEN_LIFETIME_DAYS;
pub use service::AuthenticationService;
pub use service::TokenPair;
pub use service::UserForRegistration;
