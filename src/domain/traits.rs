//! Domain traits defining contracts for external systems.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{StoredValue, WriteReceipt};

/// Database client trait for the mirrored value.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Check database connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Get the most recently updated row.
    ///
    /// Fails with `DatabaseError::NotFound` when the table is empty.
    async fn get_latest_value(&self) -> Result<StoredValue, AppError>;

    /// Overwrite the latest row, inserting one if the table is empty.
    async fn set_value(&self, value: u64) -> Result<(), AppError>;
}

/// Blockchain client trait for the storage contract.
#[async_trait]
pub trait BlockchainClient: Send + Sync {
    /// Check node connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Call `get()` on the contract.
    async fn read_value(&self) -> Result<u64, AppError>;

    /// Send `set(value)` and wait until the transaction is mined.
    async fn write_value(&self, value: u64) -> Result<WriteReceipt, AppError>;
}
