//! Application service layer.
//!
//! Orchestrates the contract and the database mirror through the domain
//! traits. The chain is the source of truth: `set` only writes the contract,
//! and the database catches up on an explicit `sync`.

use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::{
    AppError, BlockchainClient, CheckResult, DatabaseClient, HealthResponse, HealthStatus,
    SetValueRequest, WriteReceipt,
};
use crate::infra::observability::record_operation;

/// Reconciliation use cases over the contract and its database mirror.
///
/// # Example
///
/// ```ignore
/// let db = Arc::new(PostgresClient::new(options, PostgresConfig::default()).await?);
/// let chain = Arc::new(EvmContractClient::new(chain_config)?);
/// let service = AppService::new(db, chain);
///
/// service.set_value(&SetValueRequest::new(42)).await?;
/// service.sync_value().await?;
/// ```
pub struct AppService {
    db_client: Arc<dyn DatabaseClient>,
    blockchain_client: Arc<dyn BlockchainClient>,
}

impl AppService {
    /// Creates a new `AppService` instance.
    #[must_use]
    pub fn new(
        db_client: Arc<dyn DatabaseClient>,
        blockchain_client: Arc<dyn BlockchainClient>,
    ) -> Self {
        Self {
            db_client,
            blockchain_client,
        }
    }

    /// Writes a value to the contract.
    ///
    /// The request is validated before any network call. The database is
    /// not touched; use [`AppService::sync_value`] to mirror the new value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the value exceeds 10^18, or a
    /// blockchain error if signing, submission or mining fails.
    #[instrument(skip(self, request), fields(value = request.value))]
    pub async fn set_value(&self, request: &SetValueRequest) -> Result<WriteReceipt, AppError> {
        if let Err(e) = request.validate() {
            warn!(error = %e, "Rejected set request");
            record_operation("set", false);
            return Err(e.into());
        }

        let result = self.blockchain_client.write_value(request.value).await;
        record_operation("set", result.is_ok());

        let receipt = result?;
        info!(
            tx_hash = %receipt.tx_hash,
            block_number = receipt.block_number,
            "Value written to contract"
        );
        Ok(receipt)
    }

    /// Reads the current contract value. The database is not consulted.
    #[instrument(skip(self))]
    pub async fn get_value(&self) -> Result<u64, AppError> {
        let result = self.blockchain_client.read_value().await;
        record_operation("get", result.is_ok());
        result
    }

    /// Copies the contract value into the database as the latest row.
    ///
    /// # Errors
    ///
    /// Fails with the first error encountered. A failed chain read leaves
    /// the database untouched.
    #[instrument(skip(self))]
    pub async fn sync_value(&self) -> Result<u64, AppError> {
        let result = self.sync_inner().await;
        record_operation("sync", result.is_ok());
        result
    }

    async fn sync_inner(&self) -> Result<u64, AppError> {
        let value = self.blockchain_client.read_value().await.map_err(|e| {
            warn!(error = %e, "Sync aborted: chain read failed");
            e
        })?;

        self.db_client.set_value(value).await.map_err(|e| {
            warn!(error = %e, value, "Sync aborted: database write failed");
            e
        })?;

        info!(value, "Database synchronized with contract");
        Ok(value)
    }

    /// Compares the contract value with the latest database row.
    ///
    /// Both reads are independent and neither side is mutated.
    #[instrument(skip(self))]
    pub async fn check_value(&self) -> Result<CheckResult, AppError> {
        let result = self.check_inner().await;
        record_operation("check", result.is_ok());
        result
    }

    async fn check_inner(&self) -> Result<CheckResult, AppError> {
        let blockchain_value = self.blockchain_client.read_value().await?;
        let stored = self.db_client.get_latest_value().await?;

        let result = CheckResult::compare(stored.value, blockchain_value);
        if !result.is_equal {
            info!(
                database_value = result.database_value,
                blockchain_value = result.blockchain_value,
                "Database and contract values differ"
            );
        }
        Ok(result)
    }

    /// Performs a health check on all dependencies.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let db_health = match self.db_client.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Database health check failed");
                HealthStatus::Unhealthy
            }
        };

        let blockchain_health = match self.blockchain_client.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Blockchain health check failed");
                HealthStatus::Unhealthy
            }
        };

        HealthResponse::new(db_health, blockchain_health)
    }
}
