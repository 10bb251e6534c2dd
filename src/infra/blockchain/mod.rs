//! Blockchain client implementations.

pub mod evm;

pub use evm::{EvmClientConfig, EvmContractClient};
