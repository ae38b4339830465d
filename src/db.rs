//! Database connection pool and migration management.
//!
//! The pool is created once at startup, shared by every request through the
//! Postgres-backed membership store, and closed on shutdown.

use std::time::Duration;

use sqlx::{Pool, Postgres};

use crate::config::{Config, ConfigError};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// # Configuration
///
/// - Maximum connections: `DB_MAX_CONNECTIONS`
/// - Acquire timeout: `DB_ACQUIRE_TIMEOUT_SECS`. A request that cannot get a
///   connection in time fails with a database error, which the scan endpoint
///   reports as `internal_error`.
///
/// # Errors
///
/// Returns an error if:
/// - No connection string is configured
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(config: &Config) -> anyhow::Result<DbPool> {
    let url = config
        .connection_url()
        .ok_or(ConfigError::MissingDatabaseUrl)?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(url)
        .await?;

    Ok(pool)
}

/// Run database migrations from the `migrations/` directory.
///
/// Applied migrations are tracked in `_sqlx_migrations`, so each file runs
/// only once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
