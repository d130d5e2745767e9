//! HTTP routing configuration.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::app::AppState;

use super::handlers::{
    balance_handler, create_wallet_handler, health_check_handler, liveness_handler,
    metrics_handler, reward_handler, root_handler,
};
use super::middleware::{catch_faults, deadline, install_panic_hook, json_response, require_bearer};

/// Wrap `routes` in the protected chain: catch, deadline, auth, then JSON.
///
/// `ServiceBuilder` applies its first layer outermost, so faults raised by
/// the auth check and elapsed deadlines are captured as well.
pub fn protected(routes: Router<Arc<AppState>>, state: &Arc<AppState>) -> Router<Arc<AppState>> {
    routes.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(catch_faults))
            .layer(middleware::from_fn_with_state(Arc::clone(state), deadline))
            .layer(middleware::from_fn_with_state(
                Arc::clone(state),
                require_bearer,
            ))
            .layer(middleware::from_fn(json_response)),
    )
}

/// Like [`protected`] without the JSON layer, for routes with a non-JSON body.
fn protected_raw(
    routes: Router<Arc<AppState>>,
    state: &Arc<AppState>,
) -> Router<Arc<AppState>> {
    routes.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(catch_faults))
            .layer(middleware::from_fn_with_state(Arc::clone(state), deadline))
            .layer(middleware::from_fn_with_state(
                Arc::clone(state),
                require_bearer,
            )),
    )
}

/// Build the gateway router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    install_panic_hook();

    let middleware = ServiceBuilder::new().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let api_routes = protected(
        Router::new()
            .route("/", get(root_handler))
            .route("/imu/balance/{address}", get(balance_handler))
            .route("/imu/reward", post(reward_handler))
            .route("/wallets/create", post(create_wallet_handler))
            .route("/health", get(health_check_handler)),
        &app_state,
    );

    let metrics_routes = protected_raw(
        Router::new().route("/metrics", get(metrics_handler)),
        &app_state,
    );

    Router::new()
        .merge(api_routes)
        .merge(metrics_routes)
        .route("/health/live", get(liveness_handler))
        .layer(middleware)
        .with_state(app_state)
}
