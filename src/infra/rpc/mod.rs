//! JSON-RPC adapters for the node and the wallet service.

pub mod node;
pub mod transport;
pub mod wallet;

pub use node::RpcNodeClient;
pub use transport::{RpcClientConfig, RpcError, RpcTransport};
pub use wallet::RpcWalletStore;
