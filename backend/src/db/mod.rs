//! PostgreSQL connection handling for the `postgres` storage backend

use crate::config::StorageConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use tracing::{info, warn};

/// Open a pool against `storage.database_url` and bring its schema up to date
pub async fn connect(storage: &StorageConfig) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&storage.database_url)
        .context("Invalid storage.database_url")?
        .application_name("fitforge");

    let pool = PgPoolOptions::new()
        .max_connections(storage.max_connections)
        .min_connections(storage.min_connections.min(storage.max_connections))
        .acquire_timeout(storage.acquire_timeout())
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(
        max_connections = storage.max_connections,
        "PostgreSQL pool ready, applying migrations"
    );
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    Ok(pool)
}

/// Round-trip a trivial query
pub async fn health_check(pool: &PgPool) -> Result<()> {
    if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
        warn!(error = %e, "PostgreSQL health check failed");
        return Err(e.into());
    }
    Ok(())
}
