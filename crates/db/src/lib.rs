//! PostgreSQL persistence for readings and alerts.
//!
//! Exposes pool construction, migrations, row models and the repository
//! structs used by both the ingestion pipeline and the read API.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Default upper bound on pooled connections (10 steady + 20 burst).
pub const DEFAULT_MAX_CONNECTIONS: u32 = 30;

/// Create a connection pool from a database URL.
///
/// Every repository call checks a connection out for a single statement and
/// returns it immediately, so ingestion inserts and API reads never share an
/// exclusive session.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .test_before_acquire(true)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the bundled migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
