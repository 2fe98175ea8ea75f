/// Authentication Routes
///
/// Registration, login, and the current-user endpoint.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthenticationService, Claims, UserForRegistration};
use crate::error::{AppError, AuthError};

/// User login request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

/// Current user information response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub user_name: String,
    pub roles: Vec<String>,
}

/// POST /api/authentication
///
/// Register a new user. Returns 201 with an empty body on success.
///
/// # Errors
/// - 400: one or more invalid fields, or a taken username/email; the body
///   lists messages per field under `errors`
/// - 500: Internal server error
pub async fn register(
    form: web::Json<UserForRegistration>,
    auth: web::Data<AuthenticationService>,
) -> Result<HttpResponse, AppError> {
    auth.register_user(form.into_inner()).await?;

    Ok(HttpResponse::Created().finish())
}

/// POST /api/authentication/login
///
/// Authenticate with username and password and receive a token pair.
///
/// # Errors
/// - 401: unknown username or wrong password (indistinguishable)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthenticationService>,
) -> Result<HttpResponse, AppError> {
    let Some(mut identity) = auth.validate_user(&form.user_name, &form.password).await? else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let tokens = auth.create_token(&mut identity, true).await?;

    tracing::info!(
        user_id = %identity.id,
        user_name = %identity.user_name,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(tokens))
}

/// GET /api/authentication/me
///
/// **Requires valid JWT access token** in Authorization header; claims are
/// injected by the JWT middleware.
pub async fn get_current_user(claims: web::ReqData<Claims>) -> HttpResponse {
    let claims = claims.into_inner();

    HttpResponse::Ok().json(CurrentUserResponse {
        user_name: claims.sub,
        roles: claims.roles,
    })
}
