//! Database integration tests using testcontainers.
//!
//! These tests need a running Docker daemon and are ignored by default.
//! Run them with `cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use testcontainers::{
    ContainerAsync, GenericImage, ImageExt,
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
};

use chain_value_sync::app::AppService;
use chain_value_sync::domain::{AppError, DatabaseClient, DatabaseError, SetValueRequest};
use chain_value_sync::infra::{PostgresClient, PostgresConfig};
use chain_value_sync::test_utils::MockBlockchainClient;

/// Start PostgreSQL and connect a client without running migrations.
async fn start_postgres() -> (PostgresClient, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16-alpine")
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_USER", "test")
        .with_env_var("POSTGRES_PASSWORD", "test")
        .with_env_var("POSTGRES_DB", "test_db")
        .start()
        .await
        .expect("Failed to start postgres container");

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get postgres port");

    let options = PgConnectOptions::new()
        .host("127.0.0.1")
        .port(port)
        .username("test")
        .password("test")
        .database("test_db");

    // The ready message is logged once before the final restart during init.
    let mut attempts = 0;
    let client = loop {
        attempts += 1;
        match PostgresClient::new(options.clone(), PostgresConfig::default()).await {
            Ok(client) => break client,
            Err(_) if attempts < 30 => {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Err(e) => panic!("Failed to connect to postgres after 30 attempts: {:?}", e),
        }
    };

    (client, container)
}

async fn setup_postgres() -> (PostgresClient, ContainerAsync<GenericImage>) {
    let (client, container) = start_postgres().await;
    client.bootstrap().await.expect("Failed to bootstrap schema");
    (client, container)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_bootstrap_seeds_zero_row() {
    let (client, _container) = setup_postgres().await;

    let latest = client.get_latest_value().await.unwrap();
    assert_eq!(latest.value, 0);

    // Bootstrapping again must not add a second seed row.
    client.bootstrap().await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stored_values")
        .fetch_one(client.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_set_value_updates_latest_row() {
    let (client, _container) = setup_postgres().await;

    client.set_value(42).await.unwrap();
    let first = client.get_latest_value().await.unwrap();
    assert_eq!(first.value, 42);

    client.set_value(1_000_000_000_000_000_000).await.unwrap();
    let second = client.get_latest_value().await.unwrap();
    assert_eq!(second.value, 1_000_000_000_000_000_000);
    assert_eq!(second.id, first.id);
    assert!(second.updated_at >= first.updated_at);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_empty_table_not_found_then_insert() {
    let (client, _container) = setup_postgres().await;
    sqlx::query("DELETE FROM stored_values")
        .execute(client.pool())
        .await
        .unwrap();

    let err = client.get_latest_value().await.unwrap_err();
    assert!(matches!(err, AppError::Database(DatabaseError::NotFound(_))));
    assert!(err.to_string().contains("no values found in database"));

    client.set_value(9).await.unwrap();
    assert_eq!(client.get_latest_value().await.unwrap().value, 9);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_writers_on_empty_table_insert_once() {
    let (client, _container) = setup_postgres().await;
    sqlx::query("DELETE FROM stored_values")
        .execute(client.pool())
        .await
        .unwrap();

    let client = Arc::new(client);
    let handles: Vec<_> = (1..=8u64)
        .map(|value| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.set_value(value).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stored_values")
        .fetch_one(client.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_value_above_bigint_rejected() {
    let (client, _container) = setup_postgres().await;

    let err = client.set_value(u64::MAX).await.unwrap_err();
    assert!(matches!(err, AppError::Database(DatabaseError::OutOfRange(_))));
    assert_eq!(client.get_latest_value().await.unwrap().value, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check() {
    let (client, _container) = start_postgres().await;
    assert!(client.health_check().await.is_ok());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_sync_against_postgres() {
    let (client, _container) = setup_postgres().await;
    let db = Arc::new(client);
    let chain = Arc::new(MockBlockchainClient::new());
    let service = AppService::new(db.clone(), chain);

    service.set_value(&SetValueRequest::new(100)).await.unwrap();
    service.sync_value().await.unwrap();
    service.set_value(&SetValueRequest::new(200)).await.unwrap();
    service.sync_value().await.unwrap();

    let check = service.check_value().await.unwrap();
    assert!(check.is_equal);
    assert_eq!(check.database_value, 200);
}
