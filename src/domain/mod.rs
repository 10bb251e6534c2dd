//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, BlockchainError, ConfigError, DatabaseError, ValidationError};
pub use traits::{BlockchainClient, DatabaseClient};
pub use types::{
    CheckResult, ErrorResponse, HealthResponse, HealthStatus, MAX_SETTABLE_VALUE,
    MessageResponse, SetValueRequest, StoredValue, ValueResponse, WriteReceipt,
};
