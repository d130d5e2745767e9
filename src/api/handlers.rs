//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{BytesRejection, PathRejection},
    },
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::app::AppState;
use crate::domain::{AppError, CreateWalletRequest, ErrorCode, RewardRequest, build_error};

use super::middleware::HandlerFault;
use super::reply::Reply;

/// Content type of the Prometheus text exposition format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Map an extractor rejection onto the gateway's error taxonomy.
fn rejected(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(text)
    } else if status.is_server_error() {
        AppError::Internal(text)
    } else {
        AppError::Decode(text)
    }
}

/// Parse a JSON request body, reporting syntax and shape errors as 400s.
fn decode_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, AppError> {
    let body = body.map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
    serde_json::from_slice(&body).map_err(|e| AppError::Decode(e.to_string()))
}

/// Demo root page
pub async fn root_handler(State(state): State<Arc<AppState>>) -> Result<Reply, AppError> {
    let greeting = state.service.root_greeting()?;
    Ok(Reply::text(greeting))
}

/// Token balance of a wallet address
pub async fn balance_handler(
    State(state): State<Arc<AppState>>,
    address: Result<Path<String>, PathRejection>,
) -> Result<Reply, AppError> {
    let Path(address) =
        address.map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
    let balance = state.service.balance_of(&address).await?;
    Reply::json(&balance)
}

/// Create a password protected wallet
pub async fn create_wallet_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Reply, AppError> {
    let request: CreateWalletRequest = decode_body(body)?;
    let wallet = state.service.create_wallet(request).await?;
    Reply::json(&wallet)
}

/// Queue a reward for an address
pub async fn reward_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Reply, AppError> {
    let request: RewardRequest = decode_body(body)?;
    state.service.reward(request)?;
    Reply::json(&json!({}))
}

/// Detailed health check
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Result<Reply, AppError> {
    let health = state.service.health_check().await;
    Reply::json(&health)
}

/// Kubernetes liveness probe
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Prometheus scrape endpoint
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let mut response = body.into_response();
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(PROMETHEUS_CONTENT_TYPE),
    );
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Auth(_) => (StatusCode::FORBIDDEN, ErrorCode::AuthToken),
            AppError::Decode(_) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::Json)
            }
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::Json),
            AppError::Blockchain(_)
            | AppError::Wallet(_)
            | AppError::Queue(_)
            | AppError::Timeout(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Generic),
        };

        let payload = build_error(code, self.to_string());
        let mut response = (status, Json(payload)).into_response();

        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(HandlerFault::from_error(&self));
        }

        response
    }
}
