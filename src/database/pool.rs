use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::DbError;

/// Open the connection pool. Fails fast when the database is unreachable;
/// the pool is closed explicitly on shutdown by `main`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let url = config.connection_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&url)
        .await?;

    info!("Connected database pool: {}", config.name);
    Ok(pool)
}

/// Open the pool without establishing a connection up front. Used by the
/// test harness, where request paths that never reach the database must
/// still be exercisable.
pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let url = config.connection_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(&url)?;

    Ok(pool)
}

/// Apply the embedded migrations in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DbError::Migration(e.to_string()))
}

/// Pings the pool to ensure connectivity.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
