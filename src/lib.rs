//! Chain Gateway
//!
//! An authenticated JSON gateway in front of a blockchain node, a wallet
//! service and a fire-and-forget contract invocation queue.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │  catch → auth → json middleware, handlers    │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │  Use cases, dispatcher and status workers    │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │   Ports (traits), wire types, error types    │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │  JSON-RPC node/wallet clients, queue, logs   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every protected route answers `application/json`. Failures carry an
//! [`domain::ErrorPayload`] with `errorCode` 1 (bad token), 2 (bad body)
//! or 3 (server fault).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use chain_gateway::api::create_router;
//! use chain_gateway::app::AppState;
//! use chain_gateway::infra::{ChannelInvocationQueue, RpcNodeClient, RpcWalletStore};
//!
//! let node = Arc::new(RpcNodeClient::with_defaults(&config.node_rpc_url)?);
//! let wallets = Arc::new(RpcWalletStore::with_defaults(&config.wallet_rpc_url)?);
//! let (queue, receiver) = ChannelInvocationQueue::channel();
//!
//! let state = Arc::new(AppState::new(Arc::new(config), node, wallets, Arc::new(queue)));
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
