//! Application router.

use std::time::Duration;

use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::account::account_router;
use super::middleware::session_layer;
use super::state::AppState;

/// Builds the full router: account routes, session handling, request
/// tracing and a per-request timeout.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    account_router(state.clone())
        .layer(from_fn_with_state(state.clone(), session_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
