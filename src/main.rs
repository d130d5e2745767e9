use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use chain_gateway::api::create_router;
use chain_gateway::app::{AppState, spawn_dispatcher, spawn_reporter};
use chain_gateway::cli::Cli;
use chain_gateway::config::GatewayConfig;
use chain_gateway::infra::observability::{LogSettings, init_metrics_handle, init_tracing};
use chain_gateway::infra::{
    ChannelInvocationQueue, RpcClientConfig, RpcNodeClient, RpcWalletStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenv().ok();

    let _log_guard = init_tracing(&LogSettings::from_env())
        .context("failed to install the tracing subscriber")?;

    info!("Starting gateway");
    let config_path = cli.config_path();
    debug!(path = %config_path.display(), "Using config file");

    let config = GatewayConfig::load(config_path).context("failed to load configuration")?;
    debug!(network = %config.network_name, "Network settings loaded");

    let metrics = init_metrics_handle();
    if metrics.is_none() {
        warn!("Prometheus recorder not installed, /metrics will be empty");
    }

    let rpc_config = RpcClientConfig::default();
    if rpc_config.budget() >= config.request_timeout {
        warn!(
            rpc_budget = ?rpc_config.budget(),
            request_timeout = ?config.request_timeout,
            "Retried RPC calls can outlast the request deadline"
        );
    }

    // Instantiate infrastructure components
    let node = Arc::new(RpcNodeClient::new(&config.node_rpc_url, rpc_config.clone())?);
    let wallets = Arc::new(RpcWalletStore::new(&config.wallet_rpc_url, rpc_config)?);
    let (queue, receiver) = ChannelInvocationQueue::channel();

    let config = Arc::new(config);
    let app_state = Arc::new(
        AppState::new(Arc::clone(&config), node.clone(), wallets, Arc::new(queue))
            .with_metrics(metrics),
    );

    // Background workers share one shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = spawn_dispatcher(
        node,
        config.contract_hash.clone(),
        receiver,
        shutdown_rx.clone(),
    );
    let reporter = spawn_reporter(
        Arc::clone(&app_state.service),
        config.status_log_interval,
        shutdown_rx,
    );

    let router = create_router(app_state);

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, config.api_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(address = %addr, network = %config.network_name, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, shutting down workers");
    let _ = shutdown_tx.send(true);
    for (name, handle) in [("dispatcher", dispatcher), ("reporter", reporter)] {
        if let Err(e) = handle.await {
            warn!(worker = name, error = %e, "Worker ended abnormally");
        }
    }

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
