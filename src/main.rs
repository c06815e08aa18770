use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use findme_auth::{
    app::create_router,
    auth::{AuthService, LogNotifier, PasswordService, PgCredentialStore, TokenService},
    config::Config,
    db,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("FindMe Auth - Starting...");

    let config = Config::from_env()?;
    if let Err(e) = config.validate() {
        tracing::error!("Refusing to start: {}", e);
        return Err(e.into());
    }
    tracing::debug!(?config, "Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = db::connect(&config).await?;
    db::run_migrations(&pool).await?;

    let store = Arc::new(PgCredentialStore::new(pool));
    let password_service = PasswordService::new(config.hash_cost)?;
    let token_service = Arc::new(TokenService::with_lifetimes(
        &config.jwt_secret,
        config.access_token_seconds(),
        config.refresh_token_seconds(),
    ));
    let service = Arc::new(AuthService::new(
        store,
        password_service,
        token_service,
        Arc::new(LogNotifier),
    ));

    let app = create_router(service, config.request_timeout);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("FindMe Auth is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
