use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::{info, warn};

use chain_value_sync::api::create_router;
use chain_value_sync::app::AppState;
use chain_value_sync::config::AppConfig;
use chain_value_sync::infra::observability::{init_metrics_handle, init_tracing};
use chain_value_sync::infra::{EvmContractClient, PostgresClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    let metrics = init_metrics_handle();

    let db_client = PostgresClient::new(config.database.connect_options(), config.pool.clone())
        .await
        .context("failed to connect to PostgreSQL")?;
    db_client
        .bootstrap()
        .await
        .context("failed to prepare database schema")?;

    let blockchain_client =
        EvmContractClient::new(config.chain.clone()).context("failed to create EVM client")?;
    if !blockchain_client.has_contract() {
        warn!("CONTRACT_ADDRESS not set; get, sync, check and set will fail until configured");
    }
    if !blockchain_client.has_signer() {
        warn!("PRIVATE_KEY not set; set will fail until configured");
    }

    let db_client = Arc::new(db_client);
    let app_state = Arc::new(
        AppState::new(db_client.clone(), Arc::new(blockchain_client)).with_metrics(metrics),
    );
    let router = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, node_url = %config.chain.node_url, "Server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_client.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
