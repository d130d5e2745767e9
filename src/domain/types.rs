use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Numeric codes carried in [`ErrorPayload::error_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    AuthToken = 1,
    Json = 2,
    Generic = 3,
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error body returned by every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error_code: u16,
    pub error_message: String,
}

/// Builds the error body for a failed request. Serialization is left to the caller.
pub fn build_error(code: ErrorCode, message: impl Into<String>) -> ErrorPayload {
    ErrorPayload {
        error_code: code.into(),
        error_message: message.into(),
    }
}

/// A single argument of a contract invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InvocationArg {
    Integer(i64),
    Text(String),
}

impl From<i64> for InvocationArg {
    fn from(value: i64) -> Self {
        InvocationArg::Integer(value)
    }
}

impl From<&str> for InvocationArg {
    fn from(value: &str) -> Self {
        InvocationArg::Text(value.to_string())
    }
}

impl From<String> for InvocationArg {
    fn from(value: String) -> Self {
        InvocationArg::Text(value)
    }
}

/// A deferred smart-contract call. `contract_id` names the contract entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    pub id: Uuid,
    pub contract_id: String,
    pub arguments: Vec<InvocationArg>,
}

impl InvocationRequest {
    pub fn new(contract_id: impl Into<String>, arguments: Vec<InvocationArg>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id: contract_id.into(),
            arguments,
        }
    }
}

/// Wallet credentials returned by the wallet store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedWallet {
    pub address: String,
    pub nep2_key: String,
}

/// Token balance of an address as reported by the node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub address: String,
    pub balance: Option<u64>,
    /// When the gateway read the balance from the node, not when the
    /// balance last changed on chain. `None` whenever `balance` is.
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body of `POST /wallets/create`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWalletRequest {
    #[validate(
        required(message = "No password in request body."),
        length(min = 8, message = "Password needs a minimum length of 8 characters.")
    )]
    pub password: Option<String>,
}

impl CreateWalletRequest {
    /// Moves the validated password into a secret.
    pub fn into_secret(self) -> Option<SecretString> {
        self.password.map(SecretString::from)
    }
}

/// Request body of `POST /imu/reward`.
#[derive(Debug, Deserialize, Validate)]
pub struct RewardRequest {
    #[validate(
        required(message = "Missing address."),
        length(min = 34, message = "Address not 34 characters")
    )]
    pub address: Option<String>,
}

/// Path parameter of `GET /imu/balance/{address}`.
#[derive(Debug, Deserialize, Validate)]
pub struct BalanceQuery {
    #[validate(length(min = 34, message = "Address not 34 characters"))]
    pub address: String,
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub node: HealthStatus,
    pub wallet: HealthStatus,
    pub queue: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// A closed queue makes the gateway unhealthy. An unreachable node or
    /// wallet service only degrades it.
    pub fn new(node: HealthStatus, wallet: HealthStatus, queue: HealthStatus) -> Self {
        let status = match (&node, &wallet, &queue) {
            (_, _, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            (HealthStatus::Healthy, HealthStatus::Healthy, HealthStatus::Healthy) => {
                HealthStatus::Healthy
            }
            _ => HealthStatus::Degraded,
        };

        Self {
            status,
            node,
            wallet,
            queue,
            timestamp: Utc::now(),
        }
    }
}

/// Current chain height as seen by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStatus {
    pub block_height: u64,
    pub header_height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_fields() {
        let payload = build_error(ErrorCode::AuthToken, "Wrong auth token");
        assert_eq!(payload.error_code, 1);
        assert_eq!(payload.error_message, "Wrong auth token");
    }

    #[test]
    fn test_error_payload_wire_names() {
        let payload = build_error(ErrorCode::Generic, "boom");
        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(object["errorCode"], 3);
        assert_eq!(object["errorMessage"], "boom");
    }

    #[test]
    fn test_invocation_request_ids_are_unique() {
        let a = InvocationRequest::new("test", vec![1i64.into(), 2i64.into()]);
        let b = InvocationRequest::new("test", vec![1i64.into(), 2i64.into()]);
        assert_ne!(a.id, b.id);
        assert_eq!(a.arguments, b.arguments);
    }

    #[test]
    fn test_invocation_args_serialize_untagged() {
        let request = InvocationRequest::new("test", vec![1i64.into(), "x".into()]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contractId"], "test");
        assert_eq!(value["arguments"], serde_json::json!([1, "x"]));
    }

    #[test]
    fn test_create_wallet_request_rules() {
        let missing: CreateWalletRequest = serde_json::from_str("{}").unwrap();
        let err = crate::domain::AppError::from(missing.validate().unwrap_err());
        assert_eq!(err.to_string(), "No password in request body.");

        let short: CreateWalletRequest =
            serde_json::from_str(r#"{"password": "abc"}"#).unwrap();
        let err = crate::domain::AppError::from(short.validate().unwrap_err());
        assert_eq!(
            err.to_string(),
            "Password needs a minimum length of 8 characters."
        );

        let ok: CreateWalletRequest =
            serde_json::from_str(r#"{"password": "testpwd123"}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.into_secret().is_some());
    }

    #[test]
    fn test_reward_request_rules() {
        let missing: RewardRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.validate().is_err());

        let short: RewardRequest = serde_json::from_str(r#"{"address": "Abc"}"#).unwrap();
        assert!(short.validate().is_err());

        let ok: RewardRequest =
            serde_json::from_str(r#"{"address": "AbacVZYsiBi8kWGBkeq8fbgoTqwQFrj638"}"#).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_balance_response_serializes_unix_seconds() {
        let response = BalanceResponse {
            address: "addr".to_string(),
            balance: Some(42),
            updated_at: DateTime::from_timestamp(1_700_000_000, 0),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["updatedAt"], 1_700_000_000);
        assert_eq!(value["balance"], 42);

        let unknown = BalanceResponse {
            address: "addr".to_string(),
            balance: None,
            updated_at: None,
        };
        let value = serde_json::to_value(&unknown).unwrap();
        assert!(value["balance"].is_null());
        assert!(value["updatedAt"].is_null());
    }

    #[test]
    fn test_health_response_all_healthy() {
        let response = HealthResponse::new(
            HealthStatus::Healthy,
            HealthStatus::Healthy,
            HealthStatus::Healthy,
        );
        assert_eq!(response.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_health_response_node_down_is_degraded() {
        let response = HealthResponse::new(
            HealthStatus::Unhealthy,
            HealthStatus::Healthy,
            HealthStatus::Healthy,
        );
        assert_eq!(response.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_health_response_wallet_down_is_degraded() {
        let response = HealthResponse::new(
            HealthStatus::Healthy,
            HealthStatus::Unhealthy,
            HealthStatus::Healthy,
        );
        assert_eq!(response.status, HealthStatus::Degraded);
        assert_eq!(response.wallet, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_health_response_queue_down_is_unhealthy() {
        let response = HealthResponse::new(
            HealthStatus::Healthy,
            HealthStatus::Healthy,
            HealthStatus::Unhealthy,
        );
        assert_eq!(response.status, HealthStatus::Unhealthy);
    }
}
