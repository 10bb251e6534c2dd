//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{error, info};

use crate::app::AppState;
use crate::domain::{
    AppError, CheckResult, ErrorResponse, HealthResponse, HealthStatus, MessageResponse,
    SetValueRequest, ValueResponse,
};

/// `GET /health`: liveness, never touches the dependencies.
pub async fn health_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("Service is healthy"))
}

/// `GET /health/ready`: database and node connectivity.
///
/// Responds 503 with the same body when any dependency is unhealthy.
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health: HealthResponse = state.service.health_check().await;
    let status = match health.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, Json(health))
}

/// `POST /set`: write a value to the contract.
pub async fn set_value_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetValueRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Deserialization(e.body_text()))?;
    let receipt = state.service.set_value(&request).await?;
    info!(tx_hash = %receipt.tx_hash, "Set request completed");
    Ok(Json(MessageResponse::new("Value set successfully")))
}

/// `GET /get`: current contract value.
pub async fn get_value_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ValueResponse>, AppError> {
    let value = state.service.get_value().await?;
    Ok(Json(ValueResponse { value }))
}

/// `POST /sync`: copy the contract value into the database.
pub async fn sync_value_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, AppError> {
    state.service.sync_value().await?;
    Ok(Json(MessageResponse::new("Value synchronized successfully")))
}

/// `GET /check`: compare contract and database values.
pub async fn check_value_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CheckResult>, AppError> {
    let result = state.service.check_value().await?;
    Ok(Json(result))
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_type) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Deserialization(_) => (StatusCode::BAD_REQUEST, "deserialization_error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Blockchain(_) => (StatusCode::INTERNAL_SERVER_ERROR, "blockchain_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
