use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthenticationService;
use crate::error::{AppError, AuthError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{get_current_user, health_check, login, refresh, register};

/// Malformed or incomplete JSON bodies get the standard error shape
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
        })
}

/// A refresh body that cannot be read fails like every other refresh
fn refresh_json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            tracing::warn!(error = %err, "Refresh rejected: unreadable request body");
            AppError::Auth(AuthError::RefreshBadRequest).into()
        })
}

pub fn run(
    listener: TcpListener,
    auth: AuthenticationService,
    static_dir: Option<String>,
) -> Result<Server, std::io::Error> {
    let keys = auth.keys().clone();
    let auth = web::Data::new(auth);

    let server = HttpServer::new(move || {
        let app = App::new()
            .wrap(LoggerMiddleware)
            .app_data(auth.clone())
            .app_data(json_config())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/api/authentication", web::post().to(register))
            .route("/api/authentication/login", web::post().to(login))
            .service(
                web::resource("/api/token/refresh")
                    .app_data(refresh_json_config())
                    .route(web::post().to(refresh)),
            )

            // Protected routes
            .service(
                web::scope("/api/authentication/me")
                    .wrap(JwtMiddleware::new(keys.clone()))
                    .route("", web::get().to(get_current_user)),
            );

        // Static SPA build, must be last to not shadow API routes
        match &static_dir {
            Some(dir) => app.service(fs::Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .listen(listener)?
    .run();

    Ok(server)
}
