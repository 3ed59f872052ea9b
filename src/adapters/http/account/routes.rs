//! Route configuration for the account endpoints.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::middleware::require_auth;
use crate::adapters::http::state::AppState;

use super::handlers::{index, signin, signin_form, signout, status};

/// Creates the account router.
///
/// Routes:
/// - `GET /account/signin` - Sign-in form
/// - `POST /account/signin` - Submit credentials
/// - `POST /account/signout` - Sign out
/// - `GET /account/status` - Auth state as JSON
/// - `GET /` and `GET /index/index` - Guarded landing page
///
/// Expects `session_layer` to be applied by the caller.
pub fn account_router(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/", get(index))
        .route("/index/index", get(index))
        .route_layer(from_fn_with_state(state, require_auth));

    Router::new()
        .route("/account/signin", get(signin_form).post(signin))
        .route("/account/signout", post(signout))
        .route("/account/status", get(status))
        .merge(guarded)
}
