//! Database setup and the fee rate store implementations.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryFeeRateStore;
pub use postgres::PgFeeRateStore;
pub use repository::{FeeRateStore, RateFilter, RatePatch};

pub type DatabasePool = Pool<Postgres>;

pub async fn setup_database(database_url: &str, max_connections: u32) -> Result<DatabasePool> {
    info!("Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(180))
        .test_before_acquire(true)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("SET timezone = 'UTC'").execute(&mut *conn).await?;
                sqlx::query("SET statement_timeout = '15s'")
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("Database connection established");

    Ok(pool)
}

pub async fn run_migrations(pool: &DatabasePool) -> Result<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}
