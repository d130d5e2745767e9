//! Wallet service adapter.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::domain::{AppError, CreatedWallet, WalletError, WalletStore};

use super::transport::{RpcClientConfig, RpcError, RpcTransport};

const METHOD_CREATE_WALLET: &str = "createwallet";
const METHOD_LIST_ADDRESSES: &str = "listaddress";

impl From<RpcError> for WalletError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Remote { .. } | RpcError::Empty => {
                WalletError::CreationFailed(err.to_string())
            }
            other => WalletError::Unavailable(other.to_string()),
        }
    }
}

fn wallet_error(err: RpcError) -> AppError {
    AppError::Wallet(err.into())
}

#[derive(Debug, Deserialize)]
struct CreateWalletResult {
    address: String,
    nep2key: String,
}

/// Wallet store backed by the wallet service's JSON-RPC API
pub struct RpcWalletStore {
    transport: RpcTransport,
}

impl RpcWalletStore {
    pub fn new(rpc_url: &str, config: RpcClientConfig) -> Result<Self, AppError> {
        let transport = RpcTransport::new(rpc_url, config).map_err(wallet_error)?;
        Ok(Self { transport })
    }

    pub fn with_defaults(rpc_url: &str) -> Result<Self, AppError> {
        Self::new(rpc_url, RpcClientConfig::default())
    }
}

#[async_trait]
impl WalletStore for RpcWalletStore {
    #[instrument(skip(self, password))]
    async fn create_wallet(&self, password: &SecretString) -> Result<CreatedWallet, AppError> {
        let params = json!({"password": password.expose_secret()});
        // Not retried: a repeated call would create a second wallet.
        let result: CreateWalletResult = self
            .transport
            .call_once(METHOD_CREATE_WALLET, &params)
            .await
            .map_err(wallet_error)?;

        info!(address = %result.address, "Wallet created");
        Ok(CreatedWallet {
            address: result.address,
            nep2_key: result.nep2key,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .transport
            .call(METHOD_LIST_ADDRESSES, Vec::<()>::new())
            .await
            .map_err(wallet_error)?;
        Ok(())
    }
}
