//! HTTP handlers for the sign-in surface.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};

use crate::adapters::auth::TOKEN_ADAPTER_ID;
use crate::adapters::http::error::{escape_html, ErrorPage};
use crate::adapters::http::middleware::SessionHandle;
use crate::adapters::http::state::AppState;
use crate::application::{AuthError, SignInCommand, SignInHandler, SignOutHandler};

use super::dto::{AuthStatusResponse, SignInForm};

fn error_response(state: &AppState, err: AuthError) -> Response {
    ErrorPage::from_auth_error(&err, state.verbose_errors).into_response()
}

/// Token from an `Authorization: Bearer` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// A bearer header wins over a `token` field, which wins over `user`/`pass`.
fn sign_in_command(headers: &HeaderMap, form: &SignInForm) -> SignInCommand {
    if let Some(token) = bearer_token(headers) {
        return SignInCommand::from_token(token);
    }
    if !form.token.trim().is_empty() {
        return SignInCommand::from_token(&form.token);
    }
    SignInCommand::from_form(&form.user, &form.pass)
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head><body>{body}</body></html>"
    ))
}

/// GET /account/signin - Sign-in form with the last auth message
pub async fn signin_form(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut session = handle.lock().await;
    let mut ctx = match state.auth_context(&session) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(&state, e),
    };
    // landing here ends the redirect chain
    if let Err(e) = ctx.clear_attempted_route(&mut session) {
        return error_response(&state, e);
    }

    let message = if ctx.message().is_empty() {
        String::new()
    } else {
        format!("<p class=\"message\">{}</p>", escape_html(ctx.message()))
    };
    let fields = if state.adapter.identifier() == TOKEN_ADAPTER_ID {
        "<label>Token <textarea name=\"token\" autocomplete=\"off\"></textarea></label>"
    } else {
        "<label>Username <input name=\"user\" autocomplete=\"username\"></label>\
         <label>Password <input name=\"pass\" type=\"password\" \
         autocomplete=\"current-password\"></label>"
    };
    page(
        "Sign in",
        &format!(
            "<h1>Sign in</h1>{message}\
             <form method=\"post\" action=\"/account/signin\">{fields}\
             <button type=\"submit\">Sign in</button></form>"
        ),
    )
    .into_response()
}

/// POST /account/signin - Check the submitted credentials
///
/// Takes `user`/`pass` or `token` form fields, or an
/// `Authorization: Bearer` header with no body.
pub async fn signin(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    headers: HeaderMap,
    form: Option<Form<SignInForm>>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let mut session = handle.lock().await;
    let mut ctx = match state.auth_context(&session) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(&state, e),
    };

    let cmd = sign_in_command(&headers, &form);
    match SignInHandler::new().handle(&mut ctx, &mut session, cmd).await {
        Ok(result) => Redirect::to(&result.redirect_to.to_string()).into_response(),
        Err(e) => error_response(&state, e),
    }
}

/// POST /account/signout - Sign out and return to the sign-in form
pub async fn signout(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut session = handle.lock().await;
    let mut ctx = match state.auth_context(&session) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(&state, e),
    };

    match SignOutHandler::new().handle(&mut ctx, &mut session).await {
        Ok(target) => Redirect::to(&target.to_string()).into_response(),
        Err(e) => error_response(&state, e),
    }
}

/// GET /account/status - Current auth state as JSON
pub async fn status(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let session = handle.lock().await;
    let ctx = match state.auth_context(&session) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(&state, e),
    };

    Json(AuthStatusResponse {
        authed: ctx.is_authed(),
        message: ctx.message().to_string(),
        level: ctx.access_level().await,
    })
    .into_response()
}

/// GET / and GET /index/index - Landing page behind `require_auth`
pub async fn index(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let session = handle.lock().await;
    let ctx = match state.auth_context(&session) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(&state, e),
    };

    let greeting = if ctx.is_authed() {
        format!("<p>{}</p>", escape_html(ctx.message()))
    } else {
        "<p>Authentication is disabled.</p>".to_string()
    };
    page(
        "Home",
        &format!(
            "<h1>Welcome</h1>{greeting}\
             <form method=\"post\" action=\"/account/signout\">\
             <button type=\"submit\">Sign out</button></form>"
        ),
    )
    .into_response()
}
