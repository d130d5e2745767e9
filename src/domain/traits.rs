//! Domain traits defining contracts for external systems.

use async_trait::async_trait;
use secrecy::SecretString;

use super::error::AppError;
use super::types::{CreatedWallet, InvocationRequest};

/// Blockchain node the gateway reads from and submits invocations to.
#[async_trait]
pub trait BlockchainNode: Send + Sync {
    /// Check node connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Height of the last persisted block
    async fn block_height(&self) -> Result<u64, AppError>;

    /// Height of the last known header
    async fn header_height(&self) -> Result<u64, AppError>;

    /// Token balance of `address` held by the contract, if the node knows it
    async fn balance_of(
        &self,
        contract_hash: &str,
        address: &str,
    ) -> Result<Option<u64>, AppError>;

    /// Execute one queued invocation against the contract and return the transaction id
    async fn invoke(
        &self,
        contract_hash: &str,
        request: &InvocationRequest,
    ) -> Result<String, AppError>;
}

/// Wallet service holding encrypted keys.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Create a wallet protected by `password`
    async fn create_wallet(&self, password: &SecretString) -> Result<CreatedWallet, AppError>;

    /// Check wallet service connectivity
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Fire-and-forget queue of contract invocations.
pub trait InvocationQueue: Send + Sync {
    /// Hand an invocation to the dispatcher without waiting for it to run
    fn enqueue(&self, request: InvocationRequest) -> Result<(), AppError>;

    /// False once the consumer side has gone away
    fn is_open(&self) -> bool;
}
