use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest value a client may ask to store on chain (10^18).
pub const MAX_SETTABLE_VALUE: u64 = 1_000_000_000_000_000_000;

/// Row mirrored from the contract into the `stored_values` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredValue {
    pub id: i32,
    pub value: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredValue {
    pub fn new(id: i32, value: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            value,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request payload for `POST /set`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetValueRequest {
    #[validate(range(max = MAX_SETTABLE_VALUE, message = "value is too large"))]
    pub value: u64,
}

impl SetValueRequest {
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

/// Response payload for `GET /get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueResponse {
    pub value: u64,
}

/// Point-in-time comparison between the chain and the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    pub is_equal: bool,
    pub database_value: u64,
    pub blockchain_value: u64,
}

impl CheckResult {
    pub fn compare(database_value: u64, blockchain_value: u64) -> Self {
        Self {
            is_equal: database_value == blockchain_value,
            database_value,
            blockchain_value,
        }
    }
}

/// Outcome of a mined `set` transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Generic `{"message": ...}` success body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response for the readiness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub blockchain: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(database: HealthStatus, blockchain: HealthStatus) -> Self {
        let status = match (&database, &blockchain) {
            (HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
            _ => HealthStatus::Unhealthy,
        };

        Self {
            status,
            database,
            blockchain,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_request_accepts_bound() {
        assert!(SetValueRequest::new(0).validate().is_ok());
        assert!(SetValueRequest::new(42).validate().is_ok());
        assert!(SetValueRequest::new(MAX_SETTABLE_VALUE).validate().is_ok());
    }

    #[test]
    fn test_set_value_request_rejects_above_bound() {
        for value in [MAX_SETTABLE_VALUE + 1, u64::MAX] {
            let err = SetValueRequest::new(value).validate().unwrap_err();
            assert!(err.to_string().contains("value is too large"));
        }
    }

    #[test]
    fn test_check_result_compare() {
        let equal = CheckResult::compare(42, 42);
        assert!(equal.is_equal);
        assert_eq!(equal.database_value, 42);
        assert_eq!(equal.blockchain_value, 42);

        let diverged = CheckResult::compare(100, 200);
        assert!(!diverged.is_equal);
        assert_eq!(diverged.database_value, 100);
        assert_eq!(diverged.blockchain_value, 200);
    }

    #[test]
    fn test_check_result_wire_format() {
        let json = serde_json::to_value(CheckResult::compare(1, 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "is_equal": false,
                "database_value": 1,
                "blockchain_value": 2
            })
        );
    }

    #[test]
    fn test_set_value_request_rejects_negative_and_fractional() {
        assert!(serde_json::from_str::<SetValueRequest>(r#"{"value": -1}"#).is_err());
        assert!(serde_json::from_str::<SetValueRequest>(r#"{"value": 1.5}"#).is_err());
        assert!(serde_json::from_str::<SetValueRequest>(r#"{}"#).is_err());
    }

    #[test]
    fn test_stored_value_timestamps() {
        let stored = StoredValue::new(1, 7);
        assert_eq!(stored.created_at, stored.updated_at);
        assert_eq!(stored.value, 7);
    }

    #[test]
    fn test_health_response_all_healthy() {
        let response = HealthResponse::new(HealthStatus::Healthy, HealthStatus::Healthy);
        assert_eq!(response.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_health_response_both_unhealthy() {
        let response = HealthResponse::new(HealthStatus::Unhealthy, HealthStatus::Unhealthy);
        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(response.database, HealthStatus::Unhealthy);
        assert_eq!(response.blockchain, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_health_response_unhealthy() {
        let response = HealthResponse::new(HealthStatus::Unhealthy, HealthStatus::Healthy);
        assert_eq!(response.status, HealthStatus::Unhealthy);
    }
}
