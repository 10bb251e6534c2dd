//! Infrastructure layer implementations.

pub mod blockchain;
pub mod database;
pub mod observability;

pub use blockchain::{EvmClientConfig, EvmContractClient};
pub use database::{PostgresClient, PostgresConfig};
