//! Blockchain node adapter speaking the node's JSON-RPC API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::domain::{AppError, BlockchainError, BlockchainNode, InvocationArg, InvocationRequest};

use super::transport::{RpcClientConfig, RpcError, RpcTransport};

const METHOD_BLOCK_COUNT: &str = "getblockcount";
const METHOD_HEADER_COUNT: &str = "getblockheadercount";
const METHOD_INVOKE_FUNCTION: &str = "invokefunction";
const METHOD_SEND_INVOKE: &str = "sendinvokefunction";

/// VM state reported for a successful test invocation.
const STATE_HALT: &str = "HALT";

impl From<RpcError> for BlockchainError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Setup(msg) | RpcError::Transport(msg) => BlockchainError::Connection(msg),
            RpcError::Timeout(msg) => BlockchainError::Timeout(msg),
            other => BlockchainError::RpcError(other.to_string()),
        }
    }
}

fn node_error(err: RpcError) -> AppError {
    AppError::Blockchain(err.into())
}

#[derive(Debug, Deserialize)]
struct StackItem {
    #[serde(rename = "type")]
    kind: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct InvokeResult {
    state: String,
    #[serde(default)]
    stack: Vec<StackItem>,
}

#[derive(Debug, Deserialize)]
struct SendInvokeResult {
    txid: String,
}

/// Node client over JSON-RPC
pub struct RpcNodeClient {
    transport: RpcTransport,
}

impl RpcNodeClient {
    pub fn new(rpc_url: &str, config: RpcClientConfig) -> Result<Self, AppError> {
        let transport = RpcTransport::new(rpc_url, config).map_err(node_error)?;
        Ok(Self { transport })
    }

    pub fn with_defaults(rpc_url: &str) -> Result<Self, AppError> {
        Self::new(rpc_url, RpcClientConfig::default())
    }
}

/// Encode a queued argument as a contract parameter.
fn contract_parameter(arg: &InvocationArg) -> Value {
    match arg {
        InvocationArg::Integer(n) => json!({"type": "Integer", "value": n.to_string()}),
        InvocationArg::Text(s) => json!({"type": "String", "value": s}),
    }
}

/// Read an unsigned integer from the first stack item of a test invocation.
///
/// Integers arrive as decimal strings, byte arrays as little-endian hex.
/// An empty byte array is zero.
fn stack_integer(result: &InvokeResult) -> Result<Option<u64>, BlockchainError> {
    if !result.state.starts_with(STATE_HALT) {
        return Err(BlockchainError::InvocationFailed(result.state.clone()));
    }
    let Some(item) = result.stack.first() else {
        return Ok(None);
    };

    match (item.kind.as_str(), &item.value) {
        ("Integer", Value::String(raw)) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|e| BlockchainError::RpcError(format!("bad integer '{}': {}", raw, e))),
        ("Integer", Value::Number(n)) => Ok(n.as_u64()),
        ("ByteArray", Value::String(raw)) => {
            let bytes = hex::decode(raw)
                .map_err(|e| BlockchainError::RpcError(format!("bad byte array: {}", e)))?;
            if bytes.len() > 8 {
                return Err(BlockchainError::RpcError(format!(
                    "balance does not fit in 64 bits: {} bytes",
                    bytes.len()
                )));
            }
            let mut le = [0u8; 8];
            le[..bytes.len()].copy_from_slice(&bytes);
            Ok(Some(u64::from_le_bytes(le)))
        }
        (kind, _) => Err(BlockchainError::RpcError(format!(
            "unexpected stack item type {}",
            kind
        ))),
    }
}

#[async_trait]
impl BlockchainNode for RpcNodeClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let _: u64 = self
            .transport
            .call(METHOD_BLOCK_COUNT, Vec::<()>::new())
            .await
            .map_err(node_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn block_height(&self) -> Result<u64, AppError> {
        let count: u64 = self
            .transport
            .call(METHOD_BLOCK_COUNT, Vec::<()>::new())
            .await
            .map_err(node_error)?;
        Ok(count.saturating_sub(1))
    }

    #[instrument(skip(self))]
    async fn header_height(&self) -> Result<u64, AppError> {
        let count: u64 = self
            .transport
            .call(METHOD_HEADER_COUNT, Vec::<()>::new())
            .await
            .map_err(node_error)?;
        Ok(count.saturating_sub(1))
    }

    #[instrument(skip(self))]
    async fn balance_of(
        &self,
        contract_hash: &str,
        address: &str,
    ) -> Result<Option<u64>, AppError> {
        let params = json!([
            contract_hash,
            "balanceOf",
            [{"type": "ByteArray", "value": hex::encode(address.as_bytes())}]
        ]);
        let result: InvokeResult = self
            .transport
            .call(METHOD_INVOKE_FUNCTION, params)
            .await
            .map_err(node_error)?;
        let balance = stack_integer(&result)?;
        debug!(address = %address, balance = ?balance, "Read balance");
        Ok(balance)
    }

    #[instrument(skip(self, request), fields(invocation_id = %request.id, contract_id = %request.contract_id))]
    async fn invoke(
        &self,
        contract_hash: &str,
        request: &InvocationRequest,
    ) -> Result<String, AppError> {
        let arguments: Vec<Value> = request.arguments.iter().map(contract_parameter).collect();
        let params = json!([contract_hash, request.contract_id, arguments]);

        let result: SendInvokeResult = self
            .transport
            .call_once(METHOD_SEND_INVOKE, &params)
            .await
            .map_err(node_error)?;
        info!(txid = %result.txid, "Invocation sent");
        Ok(result.txid)
    }
}
