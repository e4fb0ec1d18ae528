//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Persistence is optional. When `DATABASE_URL` is set, startup builds the
//! shared SQLx pool here and applies migrations before the persistence
//! worker starts archiving finished ceremonies.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
