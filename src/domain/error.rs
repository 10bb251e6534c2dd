//! Application error types with proper error chaining.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    Connection(String),
    #[error("Database query failed: {0}")]
    Query(String),
    #[error("Database record not found: {0}")]
    NotFound(String),
    #[error("Database value out of range: {0}")]
    OutOfRange(String),
    #[error("Database pool exhausted: {0}")]
    PoolExhausted(String),
    #[error("Database migration failed: {0}")]
    Migration(String),
}

#[derive(Error, Debug, Clone)]
pub enum BlockchainError {
    #[error("Node connection failed: {0}")]
    Connection(String),
    #[error("Blockchain client not configured: {0}")]
    NotConfigured(String),
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
    #[error("Contract call failed: {0}")]
    CallFailed(String),
    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    #[error("Timeout waiting for confirmation: {0}")]
    Timeout(String),
    #[error("Chain value out of range: {0}")]
    ValueOutOfRange(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Validation failed: {0}")]
    Multiple(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid request payload: {0}")]
    Deserialization(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(ValidationError::Multiple(err.to_string()))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted("Pool timed out".to_string()),
            sqlx::Error::Io(io_err) => DatabaseError::Connection(io_err.to_string()),
            sqlx::Error::Database(db_err) => DatabaseError::Query(db_err.message().to_string()),
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(DatabaseError::Migration(err.to_string()))
    }
}
