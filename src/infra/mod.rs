//! Infrastructure layer implementations.

pub mod observability;
pub mod queue;
pub mod rpc;

pub use queue::{ChannelInvocationQueue, InvocationReceiver};
pub use rpc::{RpcClientConfig, RpcNodeClient, RpcWalletStore};
