use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

/// Connection pool shared by the credential store
pub type DbPool = PgPool;

/// Open the account database pool described by `config`
///
/// Acquiring a connection gives up after three seconds so a stalled
/// database surfaces as a request error instead of a hung handler.
pub async fn connect(config: &Config) -> Result<DbPool, sqlx::Error> {
    tracing::debug!(
        max_connections = config.database_max_connections,
        "Opening account database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await?;

    tracing::info!("Account database pool ready");
    Ok(pool)
}

/// Bring the `accounts` schema up to date
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Account schema migrated");
    Ok(())
}
