//! Application state shared across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::database::repository::FeeRateStore;
use crate::services::{DashboardService, FeeRateService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Fee rate store, also used directly by the health check
    pub store: Arc<dyn FeeRateStore>,
    /// Fee rate approval workflow service
    pub rate_service: FeeRateService,
    /// Dashboard aggregation service
    pub dashboard_service: DashboardService,
    /// Prometheus exposition handle
    pub metrics: PrometheusHandle,
}

impl axum::extract::FromRef<AppState> for DashboardService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dashboard_service.clone()
    }
}
