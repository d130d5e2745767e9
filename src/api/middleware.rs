//! HTTP middleware for API layer.
//!
//! Protected routes run through four layers, outermost first:
//! [`catch_faults`], [`deadline`], [`require_bearer`], [`json_response`].

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use tracing::{error, warn};

use crate::app::AppState;
use crate::domain::{AppError, AuthError, ErrorCode, build_error};

use super::reply::Reply;

/// Marker left in the extensions of a 500 response so the capture layer can
/// log the underlying error.
#[derive(Debug, Clone)]
pub struct HandlerFault {
    pub message: String,
    pub detail: String,
}

impl HandlerFault {
    pub fn from_error(err: &AppError) -> Self {
        Self {
            message: err.to_string(),
            detail: format!("{:?}", err),
        }
    }
}

thread_local! {
    static LAST_PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a panic hook that records a backtrace for [`catch_faults`] to log.
///
/// The trace is kept per thread; `catch_unwind` observes the panic on the
/// thread that raised it. Safe to call more than once.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            LAST_PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// Take the backtrace recorded by the most recent panic on this thread.
pub fn take_panic_trace() -> Option<String> {
    LAST_PANIC_TRACE.with(|slot| slot.borrow_mut().take())
}

/// Constant-time comparison of two byte slices to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Checks that `Authorization` is exactly `Bearer <token>`.
///
/// No trimming and no case folding: any other value fails.
pub fn authorize(headers: &HeaderMap, token: &str) -> Result<(), AuthError> {
    let provided = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;
    let expected = format!("Bearer {}", token);

    // Compare via SHA-256 digests so the comparison time does not depend on the token
    let expected_hash = Sha256::digest(expected.as_bytes());
    let provided_hash = Sha256::digest(provided.as_bytes());

    if constant_time_eq(expected_hash.as_slice(), provided_hash.as_slice()) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

/// Bearer-token authentication middleware.
/// Rejects the request with 403 before the handler runs.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Err(e) = authorize(request.headers(), state.config.auth_token.expose_secret()) {
        metrics::counter!("gateway_auth_failures_total").increment(1);
        warn!(path = %request.uri().path(), reason = %e, "API auth failed");
        return AppError::Auth(e).into_response();
    }

    next.run(request).await
}

/// Per-request deadline. Runs inside [`catch_faults`] so an elapsed request
/// still gets the 500 error payload and is logged as a fault.
pub async fn deadline(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limit = state.config.request_timeout;
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            metrics::counter!("gateway_request_timeouts_total").increment(1);
            AppError::Timeout(limit).into_response()
        }
    }
}

/// Renders the handler's [`Reply`] and marks every response as JSON.
pub async fn json_response(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(reply) = response.extensions_mut().remove::<Reply>() {
        match reply.render() {
            Ok(body) => *response.body_mut() = Body::from(body),
            Err(e) => response = e.into_response(),
        }
    }

    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Outermost failure boundary.
///
/// Logs error responses produced by inner layers and turns panics into a
/// 500 payload instead of dropping the connection.
pub async fn catch_faults(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => {
            if let Some(fault) = response.extensions().get::<HandlerFault>() {
                metrics::counter!("gateway_handler_faults_total").increment(1);
                error!(
                    method = %method,
                    path = %path,
                    error = %fault.message,
                    detail = %fault.detail,
                    "Request failed"
                );
            }
            response
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            let trace = take_panic_trace().unwrap_or_else(|| "not captured".to_string());
            metrics::counter!("gateway_handler_faults_total").increment(1);
            error!(
                method = %method,
                path = %path,
                panic = %message,
                trace = %trace,
                "Handler panicked"
            );

            let payload = build_error(
                ErrorCode::Generic,
                format!("handler panicked: {}", message),
            );
            let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
