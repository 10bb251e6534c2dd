//! Logging and Prometheus metrics.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

/// Prometheus handle for on-demand scrape output (GET /metrics).
pub type PrometheusHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Counter incremented once per service operation.
pub const OPERATIONS_METRIC: &str = "chain_value_operations_total";

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info` for this crate and
/// `tower_http`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chain_value_sync=info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}

/// Install the global metrics recorder and return a handle for rendering.
///
/// No HTTP listener is started; the API renders the handle itself.
///
/// # Errors
/// Returns an error if a recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Wrap the handle in an Arc for app state, or `None` if installation failed.
#[must_use]
pub fn init_metrics_handle() -> Option<Arc<PrometheusHandle>> {
    match init_metrics() {
        Ok(handle) => Some(Arc::new(handle)),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder unavailable");
            None
        }
    }
}

/// Record the outcome of one service operation.
pub fn record_operation(operation: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(OPERATIONS_METRIC, "operation" => operation, "outcome" => outcome)
        .increment(1);
}
