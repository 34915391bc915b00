use credit_risk::config::DatabaseConfig;
use credit_risk::error::AppError;
use credit_risk::SqliteStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the configured SQLite database, running migrations on first use.
pub(crate) fn open_store(config: &DatabaseConfig) -> Result<SqliteStore, AppError> {
    let store = if config.is_in_memory() {
        info!("using in-memory database");
        SqliteStore::open_in_memory()?
    } else {
        info!(path = %config.path, "opening database");
        SqliteStore::open(&config.path)?
    };
    Ok(store)
}
