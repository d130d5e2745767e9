//! Periodic chain status logging.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use super::service::GatewayService;

/// Logs the node's block and header heights on a fixed interval.
pub struct ChainStatusReporter {
    service: Arc<GatewayService>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl ChainStatusReporter {
    pub fn new(
        service: Arc<GatewayService>,
        interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service,
            interval,
            shutdown_rx,
        }
    }

    /// Run until shutdown is signalled.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Starting chain status reporter");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.report_once().await;
                }
                result = self.shutdown_rx.changed() => {
                    if result.is_err() || *self.shutdown_rx.borrow() {
                        info!("Chain status reporter shutting down");
                        break;
                    }
                }
            }
        }
    }

    async fn report_once(&self) {
        match self.service.chain_status().await {
            Ok(status) => {
                info!(
                    block_height = status.block_height,
                    header_height = status.header_height,
                    "Block {} / {}",
                    status.block_height,
                    status.header_height
                );
            }
            Err(e) => warn!(error = %e, "Failed to read chain status"),
        }
    }
}

/// Spawn the reporter as a tokio task
pub fn spawn_reporter(
    service: Arc<GatewayService>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let reporter = ChainStatusReporter::new(service, interval, shutdown_rx);
    tokio::spawn(reporter.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockBlockchainNode, MockInvocationQueue, MockWalletStore};

    fn service_with(node: Arc<MockBlockchainNode>) -> Arc<GatewayService> {
        Arc::new(GatewayService::new(
            node,
            Arc::new(MockWalletStore::new()),
            Arc::new(MockInvocationQueue::new()),
            "contract".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_reporter_polls_node() {
        let node = Arc::new(MockBlockchainNode::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_reporter(
            service_with(node.clone()),
            Duration::from_millis(10),
            shutdown_rx,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("reporter should stop")
            .unwrap();

        // Each report reads two heights.
        assert!(node.call_count() >= 2);
    }

    #[tokio::test]
    async fn test_reporter_survives_node_errors() {
        let node = Arc::new(MockBlockchainNode::failing("node down"));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_reporter(
            service_with(node.clone()),
            Duration::from_millis(10),
            shutdown_rx,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        shutdown_tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "Reporter should shutdown within 2 seconds");
        assert!(node.call_count() >= 2);
    }
}
