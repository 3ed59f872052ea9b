//! Guard for routes that need a signed-in visitor.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::adapters::http::error::ErrorPage;
use crate::adapters::http::middleware::SessionHandle;
use crate::adapters::http::state::AppState;
use crate::domain::routing::Route;

/// Lets authenticated visitors through and redirects everyone else.
///
/// Must run inside [`super::session_layer`]. With authentication disabled
/// every request passes.
pub async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.policy.enabled {
        return next.run(request).await;
    }

    let Some(handle) = request.extensions().get::<SessionHandle>().cloned() else {
        return ErrorPage::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_detail("require_auth mounted without session_layer", state.verbose_errors)
            .into_response();
    };

    let redirect_to = {
        let mut session = handle.lock().await;
        let mut ctx = match state.auth_context(&session) {
            Ok(ctx) => ctx,
            Err(e) => return ErrorPage::from_auth_error(&e, state.verbose_errors).into_response(),
        };
        if ctx.is_authed() {
            None
        } else {
            let Ok(route) = Route::parse(request.uri().path()) else {
                return ErrorPage::new(StatusCode::NOT_FOUND).into_response();
            };
            match ctx.no_auth(&mut session, &route, None) {
                Ok(target) => Some(target),
                Err(e) => {
                    return ErrorPage::from_auth_error(&e, state.verbose_errors).into_response()
                }
            }
        }
    };

    match redirect_to {
        Some(target) => Redirect::to(&target.to_string()).into_response(),
        None => next.run(request).await,
    }
}
