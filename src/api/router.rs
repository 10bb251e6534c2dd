//! HTTP routing configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;

use super::handlers::{
    check_value_handler, get_value_handler, health_handler, metrics_handler, readiness_handler,
    set_value_handler, sync_value_handler,
};

/// Upper bound on a single request, including a mined `set`.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_BODY_BYTES: usize = 16 * 1024;

/// Build the application router.
///
/// Routes live under `/api/v1`; `/metrics` sits at the root.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_router_with_timeout(app_state, REQUEST_TIMEOUT)
}

/// Build the router with a custom request deadline.
///
/// A request that outlives it is answered with `504 Gateway Timeout`.
pub fn create_router_with_timeout(app_state: Arc<AppState>, request_timeout: Duration) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ));

    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/set", post(set_value_handler))
        .route("/get", get(get_value_handler))
        .route("/sync", post(sync_value_handler))
        .route("/check", get(check_value_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics_handler))
        .layer(middleware)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::test_utils::{MockBlockchainClient, MockConfig, MockDatabaseClient};

    fn router() -> Router {
        let db = Arc::new(MockDatabaseClient::with_value(0));
        let chain = Arc::new(MockBlockchainClient::new());
        create_router(Arc::new(AppState::new(db, chain)))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_route() {
        let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();
        let (status, body) = send(router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"message":"Service is healthy"}"#);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::get("/api/v1/items").body(Body::empty()).unwrap();
        let (status, _) = send(router(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let request = Request::get("/api/v1/set").body(Body::empty()).unwrap();
        let (status, _) = send(router(), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let request = Request::get("/metrics").body(Body::empty()).unwrap();
        let (status, _) = send(router(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let payload = format!(r#"{{"value": 1, "pad": "{}"}}"#, "x".repeat(MAX_BODY_BYTES));
        let request = Request::post("/api/v1/set")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .unwrap();
        let (status, _) = send(router(), request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_stalled_chain_is_gateway_timeout() {
        let db = Arc::new(MockDatabaseClient::with_value(0));
        let chain = Arc::new(MockBlockchainClient::with_config(
            MockConfig::success().with_latency(500),
        ));
        let router = create_router_with_timeout(
            Arc::new(AppState::new(db.clone(), chain)),
            Duration::from_millis(50),
        );

        let request = Request::post("/api/v1/sync").body(Body::empty()).unwrap();
        let (status, _) = send(router, request).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(status.is_server_error());
        assert_eq!(db.write_count(), 0);
    }
}
