//! Mock implementations for testing.
//!
//! In-memory stand-ins for the database mirror and the storage contract.
//! Both can be configured to fail, to report unhealthy, or to add latency.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::{
    AppError, BlockchainClient, BlockchainError, DatabaseClient, DatabaseError, StoredValue,
    WriteReceipt,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: Option<u64>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            latency_ms: None,
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(ms) = self.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn message_or(&self, default: &str) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| default.to_string())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock database client backed by an in-memory row list.
///
/// # Example
///
/// ```
/// use chain_value_sync::test_utils::{MockDatabaseClient, mocks::MockConfig};
///
/// // Empty table
/// let mock = MockDatabaseClient::new();
///
/// // Table seeded with one row
/// let seeded = MockDatabaseClient::with_value(0);
///
/// // Every call fails
/// let failing = MockDatabaseClient::with_config(MockConfig::failure("DB error"));
/// ```
pub struct MockDatabaseClient {
    rows: Mutex<Vec<StoredValue>>,
    config: MockConfig,
    call_count: AtomicU64,
    write_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockDatabaseClient {
    /// Creates a mock with an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a mock whose table holds a single row.
    #[must_use]
    pub fn with_value(value: u64) -> Self {
        let mock = Self::new();
        lock(&mock.rows).push(StoredValue::new(1, value));
        mock
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            config,
            call_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Number of successful `set_value` calls.
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        lock(&self.rows).len()
    }

    /// Most recently updated row, if any.
    pub fn latest(&self) -> Option<StoredValue> {
        Self::latest_of(&lock(&self.rows)).cloned()
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    fn latest_of(rows: &[StoredValue]) -> Option<&StoredValue> {
        rows.iter().max_by_key(|row| (row.updated_at, row.id))
    }

    async fn begin_call(&self) -> Result<(), AppError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.config.simulate_latency().await;
        if self.config.should_fail {
            return Err(AppError::Database(DatabaseError::Query(
                self.config.message_or("Mock database error"),
            )));
        }
        Ok(())
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn health_check(&self) -> Result<(), AppError> {
        if !self.is_healthy.load(Ordering::Relaxed) {
            self.call_count.fetch_add(1, Ordering::Relaxed);
            return Err(AppError::Database(DatabaseError::Connection(
                "Mock database unhealthy".to_string(),
            )));
        }
        self.begin_call().await
    }

    async fn get_latest_value(&self) -> Result<StoredValue, AppError> {
        self.begin_call().await?;

        let rows = lock(&self.rows);
        Self::latest_of(&rows).cloned().ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound(
                "no values found in database".to_string(),
            ))
        })
    }

    async fn set_value(&self, value: u64) -> Result<(), AppError> {
        self.begin_call().await?;

        let mut rows = lock(&self.rows);
        let latest_id = Self::latest_of(&rows).map(|row| row.id);
        match latest_id.and_then(|id| rows.iter_mut().find(|row| row.id == id)) {
            Some(row) => {
                row.value = value;
                row.updated_at = Utc::now();
            }
            None => {
                let next_id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
                rows.push(StoredValue::new(next_id, value));
            }
        }

        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Mock blockchain client simulating the storage contract.
///
/// # Example
///
/// ```
/// use chain_value_sync::test_utils::{MockBlockchainClient, mocks::MockConfig};
///
/// // Contract holding 0
/// let mock = MockBlockchainClient::new();
///
/// // Every call fails
/// let failing = MockBlockchainClient::with_config(MockConfig::failure("RPC error"));
/// ```
pub struct MockBlockchainClient {
    value: AtomicU64,
    writes: Mutex<Vec<u64>>,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
    block_height: AtomicU64,
}

impl MockBlockchainClient {
    /// Creates a mock contract holding 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a mock contract holding `value`.
    #[must_use]
    pub fn with_value(value: u64) -> Self {
        let mock = Self::new();
        mock.value.store(value, Ordering::Relaxed);
        mock
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            value: AtomicU64::new(0),
            writes: Mutex::new(Vec::new()),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
            block_height: AtomicU64::new(1000),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Values written through `write_value`, in order.
    pub fn writes(&self) -> Vec<u64> {
        lock(&self.writes).clone()
    }

    /// Change the contract value as another writer would.
    pub fn set_chain_value(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    async fn begin_call(&self) -> Result<(), String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.config.simulate_latency().await;
        if self.config.should_fail {
            return Err(self.config.message_or("Mock blockchain error"));
        }
        Ok(())
    }
}

impl Default for MockBlockchainClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockchainClient for MockBlockchainClient {
    async fn health_check(&self) -> Result<(), AppError> {
        if !self.is_healthy.load(Ordering::Relaxed) {
            self.call_count.fetch_add(1, Ordering::Relaxed);
            return Err(AppError::Blockchain(BlockchainError::Connection(
                "Mock blockchain unhealthy".to_string(),
            )));
        }
        self.begin_call()
            .await
            .map_err(|msg| AppError::Blockchain(BlockchainError::Connection(msg)))
    }

    async fn read_value(&self) -> Result<u64, AppError> {
        self.begin_call()
            .await
            .map_err(|msg| AppError::Blockchain(BlockchainError::CallFailed(msg)))?;
        Ok(self.value.load(Ordering::Relaxed))
    }

    async fn write_value(&self, value: u64) -> Result<WriteReceipt, AppError> {
        self.begin_call()
            .await
            .map_err(|msg| AppError::Blockchain(BlockchainError::TransactionFailed(msg)))?;

        let nonce = {
            let mut writes = lock(&self.writes);
            writes.push(value);
            writes.len() as u64
        };
        self.value.store(value, Ordering::Relaxed);
        let block_number = self.block_height.fetch_add(1, Ordering::Relaxed) + 1;

        Ok(WriteReceipt {
            tx_hash: format!("0x{:064x}", nonce),
            block_number,
        })
    }
}
