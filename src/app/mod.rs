//! Application layer containing the use cases, shared state and background workers.

pub mod dispatcher;
pub mod reporter;
pub mod service;
pub mod state;

pub use dispatcher::{InvocationDispatcher, spawn_dispatcher};
pub use reporter::{ChainStatusReporter, spawn_reporter};
pub use service::GatewayService;
pub use state::AppState;
