//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers and middleware via Axum's State extractor.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{BlockchainNode, InvocationQueue, WalletStore};
use crate::infra::observability::PrometheusHandle;

use super::service::GatewayService;

/// Shared application state for the Axum web server.
///
/// Holds the read-only configuration and the service built over the
/// adapters, so handlers never see concrete implementations.
///
/// # Example
///
/// ```ignore
/// let node = Arc::new(RpcNodeClient::with_defaults(&config.node_rpc_url)?);
/// let wallets = Arc::new(RpcWalletStore::with_defaults(&config.wallet_rpc_url)?);
/// let (queue, receiver) = ChannelInvocationQueue::channel();
/// let state = AppState::new(Arc::new(config), node, wallets, Arc::new(queue));
///
/// let router = create_router(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Process configuration, including the bearer token.
    pub config: Arc<GatewayConfig>,

    /// The application service containing the use cases.
    pub service: Arc<GatewayService>,

    /// Prometheus handle for GET /metrics; `None` when no recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState`, wiring a `GatewayService` to the given adapters.
    #[must_use]
    pub fn new(
        config: Arc<GatewayConfig>,
        node: Arc<dyn BlockchainNode>,
        wallets: Arc<dyn WalletStore>,
        queue: Arc<dyn InvocationQueue>,
    ) -> Self {
        let service = Arc::new(GatewayService::new(
            node,
            wallets,
            queue,
            config.contract_hash.clone(),
        ));

        Self {
            config,
            service,
            metrics: None,
        }
    }

    /// Attaches the Prometheus handle served at GET /metrics.
    #[must_use]
    pub fn with_metrics(mut self, handle: Option<Arc<PrometheusHandle>>) -> Self {
        self.metrics = handle;
        self
    }
}
