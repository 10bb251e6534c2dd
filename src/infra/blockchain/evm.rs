//! JSON-RPC client for the `SimpleStorage` contract on an EVM chain.
//!
//! Reads go through `eth_call`. Writes are signed locally with the configured
//! key, submitted with a fixed gas limit and awaited until a receipt exists.
//! Every operation builds its own provider and is bounded by a single timeout.

use std::future::Future;
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::domain::{AppError, BlockchainClient, BlockchainError, WriteReceipt};

sol! {
    #[sol(rpc)]
    contract SimpleStorage {
        function get() external view returns (uint256);
        function set(uint256 x) external;
    }
}

/// Configuration for the EVM contract client
#[derive(Debug, Clone)]
pub struct EvmClientConfig {
    pub node_url: String,
    pub contract_address: Option<String>,
    pub private_key: Option<SecretString>,
    pub gas_limit: u64,
    pub timeout: Duration,
}

impl Default for EvmClientConfig {
    fn default() -> Self {
        Self {
            node_url: "http://localhost:8545".to_string(),
            contract_address: None,
            private_key: None,
            gas_limit: 300_000,
            timeout: Duration::from_secs(10),
        }
    }
}

/// `SimpleStorage` client backed by an HTTP JSON-RPC node
pub struct EvmContractClient {
    node_url: Url,
    config: EvmClientConfig,
}

impl EvmContractClient {
    /// Create a client. Only the node URL is validated here; a missing key or
    /// address surfaces on the first operation that needs it.
    pub fn new(config: EvmClientConfig) -> Result<Self, AppError> {
        let node_url: Url = config.node_url.parse().map_err(|e| {
            BlockchainError::Connection(format!("Invalid node URL '{}': {}", config.node_url, e))
        })?;
        info!(node_url = %node_url, "Created EVM contract client");
        Ok(Self { node_url, config })
    }

    /// Create a client from a URL, key and address using default limits
    pub fn with_defaults(
        node_url: &str,
        private_key: Option<SecretString>,
        contract_address: Option<String>,
    ) -> Result<Self, AppError> {
        Self::new(EvmClientConfig {
            node_url: node_url.to_string(),
            private_key,
            contract_address,
            ..EvmClientConfig::default()
        })
    }

    /// Whether a signing key is configured
    #[must_use]
    pub fn has_signer(&self) -> bool {
        self.config.private_key.is_some()
    }

    /// Whether a contract address is configured
    #[must_use]
    pub fn has_contract(&self) -> bool {
        self.config.contract_address.is_some()
    }

    fn contract_address(&self) -> Result<Address, BlockchainError> {
        let raw = self.config.contract_address.as_deref().ok_or_else(|| {
            BlockchainError::NotConfigured("CONTRACT_ADDRESS is required".to_string())
        })?;
        parse_contract_address(raw)
    }

    fn signer(&self) -> Result<PrivateKeySigner, BlockchainError> {
        let secret = self.config.private_key.as_ref().ok_or_else(|| {
            BlockchainError::NotConfigured("PRIVATE_KEY is required to send transactions".to_string())
        })?;
        signer_from_hex(secret)
    }

    /// Run a chain operation under the configured deadline.
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match timeout(self.config.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.config.timeout, "Chain operation timed out");
                let detail = if operation == "write" {
                    format!(
                        "no receipt after {:?}, transaction may still be pending",
                        self.config.timeout
                    )
                } else {
                    format!("{} exceeded {:?}", operation, self.config.timeout)
                };
                Err(BlockchainError::Timeout(detail).into())
            }
        }
    }
}

#[async_trait]
impl BlockchainClient for EvmContractClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let provider = ProviderBuilder::new().connect_http(self.node_url.clone());
        self.bounded("health_check", async {
            let block = provider
                .get_block_number()
                .await
                .map_err(|e| BlockchainError::Connection(e.to_string()))?;
            debug!(block, "Node reachable");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn read_value(&self) -> Result<u64, AppError> {
        let address = self.contract_address()?;
        let provider = ProviderBuilder::new().connect_http(self.node_url.clone());
        let contract = SimpleStorage::new(address, provider);

        self.bounded("read", async {
            let raw = contract
                .get()
                .call()
                .await
                .map_err(|e| BlockchainError::CallFailed(e.to_string()))?;
            let value = narrow_chain_value(raw)?;
            debug!(value, "Read contract value");
            Ok(value)
        })
        .await
    }

    #[instrument(skip(self), fields(value = value))]
    async fn write_value(&self, value: u64) -> Result<WriteReceipt, AppError> {
        let address = self.contract_address()?;
        let signer = self.signer()?;
        let from = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.node_url.clone());
        let contract = SimpleStorage::new(address, provider);

        self.bounded("write", async {
            let pending = contract
                .set(U256::from(value))
                .gas(self.config.gas_limit)
                .send()
                .await
                .map_err(|e| BlockchainError::SubmissionFailed(e.to_string()))?;
            let tx_hash = *pending.tx_hash();
            debug!(%tx_hash, %from, "Transaction submitted");

            let receipt = pending
                .get_receipt()
                .await
                .map_err(|e| BlockchainError::TransactionFailed(e.to_string()))?;

            if !receipt.status() {
                return Err(BlockchainError::TransactionFailed(format!(
                    "transaction {} reverted",
                    receipt.transaction_hash
                ))
                .into());
            }

            let block_number = inclusion_block(receipt.block_number)?;
            info!(%tx_hash, block_number, "Transaction mined");
            Ok(WriteReceipt {
                tx_hash: receipt.transaction_hash.to_string(),
                block_number,
            })
        })
        .await
    }
}

/// Parse a contract address, rejecting the zero address.
pub fn parse_contract_address(raw: &str) -> Result<Address, BlockchainError> {
    let address: Address = raw.trim().parse().map_err(|e| {
        BlockchainError::NotConfigured(format!("invalid CONTRACT_ADDRESS '{}': {}", raw, e))
    })?;
    if address == Address::ZERO {
        return Err(BlockchainError::NotConfigured(
            "CONTRACT_ADDRESS must not be the zero address".to_string(),
        ));
    }
    Ok(address)
}

/// Parse a hex private key, with or without a `0x` prefix.
pub fn signer_from_hex(secret: &SecretString) -> Result<PrivateKeySigner, BlockchainError> {
    let raw = secret.expose_secret().trim();
    let key_hex = raw.strip_prefix("0x").unwrap_or(raw);
    key_hex
        .parse::<PrivateKeySigner>()
        .map_err(|e| BlockchainError::InvalidKey(e.to_string()))
}

/// Block a mined receipt was included in. A receipt without one is an error.
fn inclusion_block(block_number: Option<u64>) -> Result<u64, BlockchainError> {
    block_number.ok_or_else(|| {
        BlockchainError::TransactionFailed("receipt missing block number".to_string())
    })
}

/// Narrow a `uint256` read from the contract into the `u64` range.
pub fn narrow_chain_value(raw: U256) -> Result<u64, BlockchainError> {
    if raw > U256::from(u64::MAX) {
        return Err(BlockchainError::ValueOutOfRange(format!(
            "{} does not fit in 64 bits",
            raw
        )));
    }
    Ok(raw.to::<u64>())
}
