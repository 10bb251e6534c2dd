//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::domain::{BlockchainClient, DatabaseClient};
use crate::infra::observability::PrometheusHandle;

use super::service::AppService;

/// Shared application state for the Axum web server.
///
/// Handlers reach the adapters only through `service`, so tests can swap
/// in the mocks from `test_utils`.
#[derive(Clone)]
pub struct AppState {
    /// The application service containing business logic.
    pub service: Arc<AppService>,

    /// Prometheus handle backing `GET /metrics`, if a recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState` and wires an `AppService` to the clients.
    #[must_use]
    pub fn new(
        db_client: Arc<dyn DatabaseClient>,
        blockchain_client: Arc<dyn BlockchainClient>,
    ) -> Self {
        Self {
            service: Arc::new(AppService::new(db_client, blockchain_client)),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the metrics endpoint.
    #[must_use]
    pub fn with_metrics(mut self, handle: Option<Arc<PrometheusHandle>>) -> Self {
        self.metrics = handle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockBlockchainClient, MockDatabaseClient};

    #[test]
    fn test_app_state_is_clone() {
        let db = Arc::new(MockDatabaseClient::new());
        let blockchain = Arc::new(MockBlockchainClient::new());

        let state = AppState::new(db, blockchain);
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.service, &cloned.service));
        assert!(state.metrics.is_none());
    }

    #[tokio::test]
    async fn test_state_service_shares_clients() {
        let db = Arc::new(MockDatabaseClient::with_value(1));
        let blockchain = Arc::new(MockBlockchainClient::with_value(9));

        let state = AppState::new(db.clone(), blockchain.clone());
        state.service.sync_value().await.unwrap();

        assert_eq!(db.latest().unwrap().value, 9);
        assert_eq!(state.service.get_value().await.unwrap(), 9);
        assert_eq!(blockchain.call_count(), 2);
    }
}
