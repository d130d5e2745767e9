//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    AppError, AuthError, BlockchainError, ConfigError, QueueError, ValidationError, WalletError,
};
pub use traits::{BlockchainNode, InvocationQueue, WalletStore};
pub use types::{
    BalanceQuery, BalanceResponse, ChainStatus, CreateWalletRequest, CreatedWallet, ErrorCode,
    ErrorPayload, HealthResponse, HealthStatus, InvocationArg, InvocationRequest, RewardRequest,
    build_error,
};
