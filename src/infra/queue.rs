//! In-process invocation queue backed by an unbounded tokio channel.

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{AppError, InvocationQueue, InvocationRequest, QueueError};

/// Receiving half, drained by the invocation dispatcher.
pub type InvocationReceiver = mpsc::UnboundedReceiver<InvocationRequest>;

/// Sending half handed to request handlers.
#[derive(Clone)]
pub struct ChannelInvocationQueue {
    sender: mpsc::UnboundedSender<InvocationRequest>,
}

impl ChannelInvocationQueue {
    /// Create a queue and the receiver its dispatcher reads from.
    pub fn channel() -> (Self, InvocationReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl InvocationQueue for ChannelInvocationQueue {
    fn enqueue(&self, request: InvocationRequest) -> Result<(), AppError> {
        let id = request.id;
        let contract_id = request.contract_id.clone();
        self.sender
            .send(request)
            .map_err(|_| AppError::Queue(QueueError::Closed))?;
        metrics::counter!("gateway_invocations_enqueued_total").increment(1);
        debug!(invocation_id = %id, contract_id = %contract_id, "Invocation enqueued");
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}
