//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that can be configured to simulate various scenarios including
//! success, failure, and edge cases.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{
    AppError, BlockchainError, BlockchainNode, CreatedWallet, InvocationQueue, InvocationRequest,
    QueueError, WalletError, WalletStore,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: Option<u64>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            latency_ms: None,
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(ms) = self.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

/// Mock blockchain node for testing.
///
/// Keeps balances in memory and records every invocation it receives.
///
/// # Example
///
/// ```
/// use chain_gateway::test_utils::{MockBlockchainNode, mocks::MockConfig};
///
/// let mock = MockBlockchainNode::new();
/// mock.set_balance("AbacVZYsiBi8kWGBkeq8fbgoTqwQFrj638", 42);
///
/// let failing_mock = MockBlockchainNode::with_config(MockConfig::failure("RPC error"));
/// ```
pub struct MockBlockchainNode {
    balances: Arc<Mutex<HashMap<String, u64>>>,
    invocations: Arc<Mutex<Vec<(String, InvocationRequest)>>>,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
    block_height: AtomicU64,
    header_height: AtomicU64,
}

impl MockBlockchainNode {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            balances: Arc::new(Mutex::new(HashMap::new())),
            invocations: Arc::new(Mutex::new(Vec::new())),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
            block_height: AtomicU64::new(1000),
            header_height: AtomicU64::new(1000),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Gets the number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Sets the token balance reported for an address.
    pub fn set_balance(&self, address: &str, balance: u64) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_string(), balance);
    }

    /// Sets the block and header heights.
    pub fn set_heights(&self, block: u64, header: u64) {
        self.block_height.store(block, Ordering::Relaxed);
        self.header_height.store(header, Ordering::Relaxed);
    }

    /// Gets every `(contract_hash, request)` pair received by `invoke`, in order.
    pub fn get_invocations(&self) -> Vec<(String, InvocationRequest)> {
        self.invocations.lock().unwrap().clone()
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock blockchain error".to_string());
            return Err(AppError::Blockchain(BlockchainError::RpcError(msg)));
        }
        Ok(())
    }
}

impl Default for MockBlockchainNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockchainNode for MockBlockchainNode {
    async fn health_check(&self) -> Result<(), AppError> {
        self.increment_call_count();
        self.config.simulate_latency().await;

        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Blockchain(BlockchainError::Connection(
                "Mock node unhealthy".to_string(),
            )));
        }

        self.check_should_fail()
    }

    async fn block_height(&self) -> Result<u64, AppError> {
        self.increment_call_count();
        self.config.simulate_latency().await;
        self.check_should_fail()?;
        Ok(self.block_height.load(Ordering::Relaxed))
    }

    async fn header_height(&self) -> Result<u64, AppError> {
        self.increment_call_count();
        self.config.simulate_latency().await;
        self.check_should_fail()?;
        Ok(self.header_height.load(Ordering::Relaxed))
    }

    async fn balance_of(
        &self,
        _contract_hash: &str,
        address: &str,
    ) -> Result<Option<u64>, AppError> {
        self.increment_call_count();
        self.config.simulate_latency().await;
        self.check_should_fail()?;
        Ok(self.balances.lock().unwrap().get(address).copied())
    }

    async fn invoke(
        &self,
        contract_hash: &str,
        request: &InvocationRequest,
    ) -> Result<String, AppError> {
        self.increment_call_count();
        self.config.simulate_latency().await;
        self.check_should_fail()?;

        self.invocations
            .lock()
            .unwrap()
            .push((contract_hash.to_string(), request.clone()));
        Ok(format!("0x{}", request.id.simple()))
    }
}

/// Mock wallet store for testing.
///
/// Records the passwords it was asked to protect wallets with.
pub struct MockWalletStore {
    passwords: Arc<Mutex<Vec<String>>>,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockWalletStore {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            passwords: Arc::new(Mutex::new(Vec::new())),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Gets the number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Gets the passwords of every wallet created so far.
    pub fn passwords(&self) -> Vec<String> {
        self.passwords.lock().unwrap().clone()
    }
}

impl Default for MockWalletStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletStore for MockWalletStore {
    async fn create_wallet(&self, password: &SecretString) -> Result<CreatedWallet, AppError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.config.simulate_latency().await;

        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock wallet error".to_string());
            return Err(AppError::Wallet(WalletError::CreationFailed(msg)));
        }

        let mut passwords = self.passwords.lock().unwrap();
        passwords.push(password.expose_secret().to_string());
        let n = passwords.len();

        Ok(CreatedWallet {
            address: format!("AMockWalletAddress{:016}", n),
            nep2_key: format!("6PYMockNep2Key{:016}", n),
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Wallet(WalletError::Unavailable(
                "Mock wallet unhealthy".to_string(),
            )));
        }
        Ok(())
    }
}

/// Mock invocation queue for testing.
///
/// Stores requests instead of dispatching them.
#[derive(Default)]
pub struct MockInvocationQueue {
    requests: Arc<Mutex<Vec<InvocationRequest>>>,
    closed: AtomicBool,
}

impl MockInvocationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets every request accepted so far, in order.
    pub fn get_requests(&self) -> Vec<InvocationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Rejects all further requests.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

impl InvocationQueue for MockInvocationQueue {
    fn enqueue(&self, request: InvocationRequest) -> Result<(), AppError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(AppError::Queue(QueueError::Closed));
        }
        self.requests.lock().unwrap().push(request);
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Relaxed)
    }
}
