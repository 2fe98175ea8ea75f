use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use notes_auth::auth::{AuthenticationService, JwtKeys};
use notes_auth::configuration::get_configuration;
use notes_auth::startup::run;
use notes_auth::store::{InMemoryUserStore, PgUserStore, UserStore};
use notes_auth::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    // Refuse to start without a usable signing secret
    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let keys = JwtKeys::from_settings(&configuration.jwt_settings).map_err(|e| {
        tracing::error!("Invalid JWT settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let store: Arc<dyn UserStore> = match &configuration.database {
        Some(database) => {
            tracing::info!("Attempting to connect to database");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database.connection_string())
                .await
                .map_err(|e| {
                    tracing::error!("Failed to create connection pool: {}", e);
                    std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "Database connection error",
                    )
                })?;

            sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
            })?;

            tracing::info!("Database connection pool created successfully");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("No database configured; users are kept in memory only");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let auth = AuthenticationService::new(store, keys);
    let server = run(
        listener,
        auth,
        Some(configuration.application.static_dir.clone()),
    )?;
    tracing::info!("Server started successfully");

    server.await
}
