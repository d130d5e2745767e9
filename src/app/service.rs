//! Application service layer.
//!
//! This module contains the gateway use cases. It talks to the node, the
//! wallet store and the invocation queue only through their traits.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::{
    AppError, BalanceQuery, BalanceResponse, BlockchainNode, ChainStatus, CreateWalletRequest,
    CreatedWallet, HealthResponse, HealthStatus, InvocationQueue, InvocationRequest,
    RewardRequest, ValidationError, WalletStore,
};

/// Body of the demo root page.
pub const ROOT_GREETING: &str = "I am the root page!";

/// Contract entry point called by `POST /imu/reward`.
pub const REWARD_OPERATION: &str = "reward";

/// Application service containing the gateway use cases.
///
/// # Example
///
/// ```ignore
/// let node = Arc::new(RpcNodeClient::with_defaults(&config.node_rpc_url)?);
/// let wallets = Arc::new(RpcWalletStore::with_defaults(&config.wallet_rpc_url)?);
/// let (queue, receiver) = ChannelInvocationQueue::channel();
/// let service = GatewayService::new(node, wallets, Arc::new(queue), config.contract_hash.clone());
///
/// let balance = service.balance_of("AbacVZYsiBi8kWGBkeq8fbgoTqwQFrj638").await?;
/// ```
pub struct GatewayService {
    node: Arc<dyn BlockchainNode>,
    wallets: Arc<dyn WalletStore>,
    queue: Arc<dyn InvocationQueue>,
    contract_hash: String,
}

impl GatewayService {
    #[must_use]
    pub fn new(
        node: Arc<dyn BlockchainNode>,
        wallets: Arc<dyn WalletStore>,
        queue: Arc<dyn InvocationQueue>,
        contract_hash: String,
    ) -> Self {
        Self {
            node,
            wallets,
            queue,
            contract_hash,
        }
    }

    pub fn contract_hash(&self) -> &str {
        &self.contract_hash
    }

    /// Demo page: queues two test invocations and returns a static greeting.
    #[instrument(skip(self))]
    pub fn root_greeting(&self) -> Result<&'static str, AppError> {
        self.queue
            .enqueue(InvocationRequest::new("test", vec![1i64.into(), 2i64.into()]))?;
        self.queue
            .enqueue(InvocationRequest::new("test", vec!["x".into(), "y".into()]))?;
        Ok(ROOT_GREETING)
    }

    /// Reads the token balance of an address from the node.
    ///
    /// # Errors
    ///
    /// Returns a validation error for addresses shorter than 34 characters,
    /// or the node's error when the lookup fails.
    #[instrument(skip(self))]
    pub async fn balance_of(&self, address: &str) -> Result<BalanceResponse, AppError> {
        let query = BalanceQuery {
            address: address.to_string(),
        };
        if let Err(e) = query.validate() {
            warn!(address = %address, "Wallet address is not 34 characters");
            return Err(AppError::Validation(ValidationError::from(e)));
        }

        let balance = self
            .node
            .balance_of(&self.contract_hash, &query.address)
            .await?;
        let updated_at = balance.map(|_| Utc::now());
        info!(address = %query.address, balance = ?balance, "Token balance read");

        Ok(BalanceResponse {
            address: query.address,
            balance,
            updated_at,
        })
    }

    /// Creates a wallet protected by the request's password.
    #[instrument(skip(self, request))]
    pub async fn create_wallet(
        &self,
        request: CreateWalletRequest,
    ) -> Result<CreatedWallet, AppError> {
        request.validate().map_err(|e| {
            warn!(error = %e, "Validation failed for create wallet request");
            AppError::Validation(ValidationError::from(e))
        })?;

        let password = request
            .into_secret()
            .ok_or_else(|| AppError::Internal("validated password missing".to_string()))?;
        let wallet = self.wallets.create_wallet(&password).await?;
        info!(address = %wallet.address, "Wallet created");
        Ok(wallet)
    }

    /// Queues a reward invocation for the request's address.
    #[instrument(skip(self, request))]
    pub fn reward(&self, request: RewardRequest) -> Result<(), AppError> {
        request.validate().map_err(|e| {
            warn!(address = ?request.address, "Reward address rejected");
            AppError::Validation(ValidationError::from(e))
        })?;

        let address = request
            .address
            .ok_or_else(|| AppError::Internal("validated address missing".to_string()))?;
        info!(address = %address, "Reward address with tokens");

        let encoded = hex::encode(address.as_bytes());
        self.queue.enqueue(InvocationRequest::new(
            REWARD_OPERATION,
            vec![encoded.into()],
        ))
    }

    /// Reads the current block and header heights.
    #[instrument(skip(self))]
    pub async fn chain_status(&self) -> Result<ChainStatus, AppError> {
        let block_height = self.node.block_height().await?;
        let header_height = self.node.header_height().await?;
        Ok(ChainStatus {
            block_height,
            header_height,
        })
    }

    /// Performs a health check on the node, the wallet service and the
    /// invocation queue.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let node_health = match self.node.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Node health check failed");
                HealthStatus::Unhealthy
            }
        };

        let wallet_health = match self.wallets.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Wallet health check failed");
                HealthStatus::Unhealthy
            }
        };

        let queue_health = if self.queue.is_open() {
            HealthStatus::Healthy
        } else {
            warn!("Invocation queue is closed");
            HealthStatus::Unhealthy
        };

        HealthResponse::new(node_health, wallet_health, queue_health)
    }
}
