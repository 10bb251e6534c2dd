//! Chain Value Sync
//!
//! REST service that keeps the integer held by a `SimpleStorage` contract
//! and its PostgreSQL mirror reconcilable through four operations:
//! set, get, sync and check.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │   /api/v1 handlers, routing, error bodies    │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │   set / get / sync / check orchestration     │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │         Client traits, types, errors         │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │  EVM JSON-RPC client, PostgreSQL, telemetry  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The contract is the source of truth. `set` writes only to the chain;
//! `sync` copies the chain value into the database; `check` compares the
//! two without mutating either side.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use chain_value_sync::api::create_router;
//! use chain_value_sync::app::AppState;
//! use chain_value_sync::config::AppConfig;
//! use chain_value_sync::infra::{EvmContractClient, PostgresClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let db = Arc::new(PostgresClient::new(config.database.connect_options(), config.pool).await?);
//!     db.bootstrap().await?;
//!     let chain = Arc::new(EvmContractClient::new(config.chain)?);
//!
//!     let router = create_router(Arc::new(AppState::new(db, chain)));
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

// Mocks are public so the integration tests under tests/ can use them.
pub mod test_utils;
