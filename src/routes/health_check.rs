use actix_web::HttpResponse;

/// GET /health_check
///
/// Liveness probe; 200 with an empty body, no store access.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
