use actix_web::{web, HttpResponse};

use crate::auth::{AuthenticationService, TokenPair};
use crate::error::AppError;

/// POST /api/token/refresh
///
/// Exchange a (possibly expired) access token and its refresh token for a
/// new pair. The submitted refresh token stops working once this succeeds.
///
/// # Errors
/// - 400: any rejection, with one uniform message
pub async fn refresh(
    form: web::Json<TokenPair>,
    auth: web::Data<AuthenticationService>,
) -> Result<HttpResponse, AppError> {
    let tokens = auth.refresh_token(form.into_inner()).await?;

    Ok(HttpResponse::Ok().json(tokens))
}
