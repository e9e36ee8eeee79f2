//! Application startup and initialization logic.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use crate::app_state::AppState;
use crate::config::Config;
use crate::database::{self, PgFeeRateStore};
use crate::services::{DashboardService, FeeRateService};

/// Initialize services and build the shared application state.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("Prometheus metrics initialized");

    let db_pool = database::setup_database(&config.database_url, config.max_connections).await?;
    info!("PostgreSQL connection established");

    database::run_migrations(&db_pool).await?;

    let store = Arc::new(PgFeeRateStore::new(db_pool));
    let rate_service = FeeRateService::new(store.clone());
    let dashboard_service = DashboardService::new(
        store.clone(),
        Duration::from_secs(config.stats_cache_ttl_secs),
    );
    info!("Fee rate services initialized");

    Ok(AppState {
        config: config.clone(),
        store,
        rate_service,
        dashboard_service,
        metrics: metrics_handle,
    })
}
