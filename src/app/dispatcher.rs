//! Background worker draining the invocation queue into the node.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::domain::{BlockchainNode, InvocationRequest};
use crate::infra::InvocationReceiver;

/// Background worker executing queued contract invocations one at a time.
///
/// Failed invocations are logged and dropped; the queue gives no delivery
/// guarantee.
pub struct InvocationDispatcher {
    node: Arc<dyn BlockchainNode>,
    contract_hash: String,
    receiver: InvocationReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl InvocationDispatcher {
    pub fn new(
        node: Arc<dyn BlockchainNode>,
        contract_hash: String,
        receiver: InvocationReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            node,
            contract_hash,
            receiver,
            shutdown_rx,
        }
    }

    /// Run the worker loop until shutdown or until every sender is gone.
    pub async fn run(mut self) {
        info!(contract_hash = %self.contract_hash, "Starting invocation dispatcher");

        loop {
            tokio::select! {
                next = self.receiver.recv() => {
                    match next {
                        Some(request) => self.dispatch(request).await,
                        None => {
                            info!("Invocation queue closed, dispatcher stopping");
                            break;
                        }
                    }
                }
                result = self.shutdown_rx.changed() => {
                    if result.is_err() || *self.shutdown_rx.borrow() {
                        info!("Invocation dispatcher shutting down");
                        break;
                    }
                }
            }
        }

        self.receiver.close();
    }

    async fn dispatch(&self, request: InvocationRequest) {
        match self.node.invoke(&self.contract_hash, &request).await {
            Ok(txid) => {
                metrics::counter!("gateway_invocations_dispatched_total", "outcome" => "ok")
                    .increment(1);
                info!(
                    invocation_id = %request.id,
                    contract_id = %request.contract_id,
                    txid = %txid,
                    "Invocation dispatched"
                );
            }
            Err(e) => {
                metrics::counter!("gateway_invocations_dispatched_total", "outcome" => "error")
                    .increment(1);
                error!(
                    invocation_id = %request.id,
                    contract_id = %request.contract_id,
                    error = %e,
                    "Invocation failed"
                );
            }
        }
    }
}

/// Spawn the dispatcher as a tokio task
pub fn spawn_dispatcher(
    node: Arc<dyn BlockchainNode>,
    contract_hash: String,
    receiver: InvocationReceiver,
    shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let dispatcher = InvocationDispatcher::new(node, contract_hash, receiver, shutdown_rx);
    tokio::spawn(dispatcher.run())
}
