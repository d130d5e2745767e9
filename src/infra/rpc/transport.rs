//! JSON-RPC 2.0 transport shared by the node and wallet adapters.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Configuration for the RPC transport
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RpcClientConfig {
    /// Longest a retried call can take: every attempt times out and every
    /// retry waits the full delay.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.timeout * (self.max_retries + 1) + self.retry_delay * self.max_retries
    }
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Failure of a single RPC exchange, before it is mapped into a domain error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("client setup failed: {0}")]
    Setup(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{code}: {message}")]
    Remote { code: i64, message: String },
    #[error("empty response")]
    Empty,
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: T,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

pub struct RpcTransport {
    http_client: Client,
    url: String,
    config: RpcClientConfig,
}

impl RpcTransport {
    pub fn new(url: &str, config: RpcClientConfig) -> Result<Self, RpcError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::Setup(e.to_string()))?;
        info!(rpc_url = %url, "Created RPC transport");
        Ok(Self {
            http_client,
            url: url.to_string(),
            config,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make an RPC call with retries. Only for calls that are safe to repeat.
    #[instrument(skip(self, params), fields(rpc_url = %self.url))]
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }
            match self.call_once(method, &params).await {
                Ok(result) => return Ok(result),
                // The remote side answered; repeating the call will not change that.
                Err(e @ RpcError::Remote { .. }) => return Err(e),
                Err(e) => {
                    warn!(attempt = attempt, error = %e, method = %method, "RPC call failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or(RpcError::Empty))
    }

    /// Execute a single RPC call
    pub async fn call_once<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<R, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout(e.to_string())
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response.result.ok_or(RpcError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = RpcTransport::new("http://127.0.0.1:20332", RpcClientConfig::default());
        assert!(transport.is_ok());
        assert_eq!(transport.unwrap().url(), "http://127.0.0.1:20332");
    }

    #[test]
    fn test_rpc_client_config_default() {
        let config = RpcClientConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_default_budget_fits_request_deadline() {
        let budget = RpcClientConfig::default().budget();
        assert_eq!(budget, Duration::from_millis(21_500));
        assert!(budget < crate::config::DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_request_envelope() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getblockcount",
            params: Vec::<()>::new(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "getblockcount", "params": []})
        );
    }

    #[test]
    fn test_response_envelope_with_error() {
        let response: JsonRpcResponse<u64> = serde_json::from_str(
            r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "Method not found"}}"#,
        )
        .unwrap();
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found");
    }

    #[test]
    fn test_remote_error_display() {
        let err = RpcError::Remote {
            code: -100,
            message: "Unknown block".to_string(),
        };
        assert_eq!(err.to_string(), "-100: Unknown block");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_exhausts_retries() {
        let config = RpcClientConfig {
            timeout: Duration::from_millis(200),
            max_retries: 1,
            retry_delay: Duration::from_millis(10),
        };
        // Port 9 (discard) on loopback is not expected to speak HTTP.
        let transport = RpcTransport::new("http://127.0.0.1:9", config).unwrap();
        let result: Result<u64, RpcError> = transport.call("getblockcount", Vec::<()>::new()).await;
        assert!(matches!(
            result,
            Err(RpcError::Transport(_)) | Err(RpcError::Timeout(_))
        ));
    }
}
