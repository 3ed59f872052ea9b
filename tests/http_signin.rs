//! Integration tests for the HTTP sign-in surface.
//!
//! Requests go through the full router (session layer, guard, handlers)
//! with `tower::ServiceExt::oneshot`, carrying the session cookie between
//! them like a browser would.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use secrecy::SecretString;
use tower::ServiceExt;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use tokio::sync::watch;

use staple::adapters::auth::{AdapterRegistry, AdapterResources, MockAuthAdapter};
use staple::adapters::http::account::AuthStatusResponse;
use staple::adapters::http::{app_router, AppState, SessionCookie};
use staple::adapters::session_store::InMemorySessionStore;
use staple::application::{SessionManager, SessionSweeper};
use staple::config::{AuthConfig, TokenAuthSettings};
use staple::domain::routing::RoutePolicy;
use staple::ports::SessionStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn test_cookie() -> SessionCookie {
    SessionCookie::new(
        "staple_session",
        SecretString::new("an-integration-test-cookie-secret".to_string()),
    )
}

fn app() -> Router {
    let sessions = SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        chrono::Duration::minutes(30),
    );
    let adapter = MockAuthAdapter::new().with_user("testusername", "test&P@ssword");
    let state = AppState::new(sessions, Arc::new(adapter), RoutePolicy::default(), test_cookie());
    app_router(state, Duration::from_secs(5))
}

const JWT_SECRET: &str = "integration-jwt-secret-0123456789";
const JWT_ISSUER: &str = "https://id.example.com";

/// Router bound to the `token` adapter, resolved through the registry the
/// way the binary does it.
fn token_app() -> Router {
    let config = AuthConfig {
        adapter: "token".to_string(),
        token: Some(TokenAuthSettings {
            issuer: JWT_ISSUER.to_string(),
            audience: "staple".to_string(),
            algorithms: "HS256".to_string(),
            secret: Some(SecretString::new(JWT_SECRET.to_string())),
            level_claim: Some("level".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let adapter = AdapterRegistry::with_defaults()
        .resolve(&config, &AdapterResources::default())
        .unwrap();
    let sessions = SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        chrono::Duration::minutes(30),
    );
    let policy = config.route_policy().unwrap();
    let state = AppState::new(sessions, adapter, policy, test_cookie());
    app_router(state, Duration::from_secs(5))
}

fn jwt(secret: &str) -> String {
    let claims = json!({
        "sub": "user-7",
        "iss": JWT_ISSUER,
        "aud": "staple",
        "exp": chrono::Utc::now().timestamp() + 600,
        "level": 2,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// `name=value` part of the response's `Set-Cookie`, if any.
fn issued_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

async fn status(app: &Router, cookie: &str) -> AuthStatusResponse {
    let response = app
        .clone()
        .oneshot(get("/account/status", Some(cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

const GOOD_FORM: &str = "user=testusername&pass=test%26P%40ssword";

// =============================================================================
// Flows
// =============================================================================

#[tokio::test]
async fn full_sign_in_and_sign_out_flow() {
    let app = app();

    // anonymous visit to a guarded page
    let response = app.clone().oneshot(get("/index/index", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account/signin");
    let anonymous = issued_cookie(&response).expect("session cookie");

    let response = app
        .clone()
        .oneshot(get("/account/signin", Some(&anonymous)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("name=\"pass\""));

    // sign in
    let response = app
        .clone()
        .oneshot(post("/account/signin", Some(&anonymous), GOOD_FORM))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/index/index");
    let authed = issued_cookie(&response).expect("rotated session cookie");
    assert_ne!(authed, anonymous);

    let response = app
        .clone()
        .oneshot(get("/index/index", Some(&authed)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let current = status(&app, &authed).await;
    assert!(current.authed);
    assert_eq!(current.message, "Authentication Successful");
    assert_eq!(current.level, 1);

    // the pre-login session id is gone
    let stale = status(&app, &anonymous).await;
    assert!(!stale.authed);

    // sign out
    let response = app
        .clone()
        .oneshot(post("/account/signout", Some(&authed), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account/signin");
    let signed_out = issued_cookie(&response).expect("rotated session cookie");

    let current = status(&app, &signed_out).await;
    assert!(!current.authed);
    assert_eq!(current.message, "Logged Out");
    assert_eq!(current.level, 0);
}

#[tokio::test]
async fn wrong_password_returns_to_sign_in() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post(
            "/account/signin",
            None,
            "user=testusername&pass=wrong",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account/signin");
    let cookie = issued_cookie(&response).expect("session cookie");

    let current = status(&app, &cookie).await;
    assert!(!current.authed);
    assert_eq!(current.message, "Authentication Failed");

    let response = app
        .clone()
        .oneshot(get("/account/signin", Some(&cookie)))
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Authentication Failed"));
}

#[tokio::test]
async fn repeated_guarded_visit_without_signing_in_is_forbidden() {
    let app = app();

    let response = app.clone().oneshot(get("/index/index", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = issued_cookie(&response).unwrap();

    let response = app
        .clone()
        .oneshot(get("/index/index", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn visiting_sign_in_page_resets_the_loop_guard() {
    let app = app();

    let response = app.clone().oneshot(get("/index/index", None)).await.unwrap();
    let cookie = issued_cookie(&response).unwrap();

    app.clone()
        .oneshot(get("/account/signin", Some(&cookie)))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/index/index", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn status_of_fresh_visitor_is_anonymous() {
    let app = app();
    let response = app.clone().oneshot(get("/account/status", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(issued_cookie(&response).is_none());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let current: AuthStatusResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        current,
        AuthStatusResponse {
            authed: false,
            message: String::new(),
            level: 0,
        }
    );
}

// =============================================================================
// Bearer tokens
// =============================================================================

#[tokio::test]
async fn token_adapter_signs_in_with_bearer_header() {
    let app = token_app();

    let request = Request::builder()
        .method("POST")
        .uri("/account/signin")
        .header(AUTHORIZATION, format!("Bearer {}", jwt(JWT_SECRET)))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/index/index");
    let cookie = issued_cookie(&response).expect("session cookie");

    let current = status(&app, &cookie).await;
    assert!(current.authed);
    assert_eq!(current.message, "Authentication Successful");
    assert_eq!(current.level, 2);

    let response = app
        .clone()
        .oneshot(get("/index/index", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_adapter_signs_in_with_token_field() {
    let app = token_app();

    let response = app
        .clone()
        .oneshot(get("/account/signin", None))
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("name=\"token\""));

    let form = format!("token={}", jwt(JWT_SECRET));
    let response = app
        .clone()
        .oneshot(post("/account/signin", None, &form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/index/index");

    let cookie = issued_cookie(&response).unwrap();
    assert!(status(&app, &cookie).await.authed);
}

#[tokio::test]
async fn token_signed_with_another_key_is_rejected() {
    let app = token_app();

    let form = format!("token={}", jwt("some-other-secret-0123456789abcdef"));
    let response = app
        .clone()
        .oneshot(post("/account/signin", None, &form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account/signin");

    let cookie = issued_cookie(&response).unwrap();
    let current = status(&app, &cookie).await;
    assert!(!current.authed);
    assert_eq!(current.message, "Authentication Failed");
}

// =============================================================================
// Session expiry
// =============================================================================

#[tokio::test]
async fn sweeper_clears_sessions_left_by_anonymous_visits() {
    let store = Arc::new(InMemorySessionStore::new());
    let sessions = SessionManager::new(store.clone(), chrono::Duration::milliseconds(1));
    let adapter = MockAuthAdapter::new().with_user("testusername", "test&P@ssword");
    let state = AppState::new(
        sessions.clone(),
        Arc::new(adapter),
        RoutePolicy::default(),
        test_cookie(),
    );
    let app = app_router(state, Duration::from_secs(5));

    for _ in 0..100 {
        let response = app.clone().oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
    assert_eq!(store.len().await, 100);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let sweeper = SessionSweeper::new(sessions, Duration::from_millis(10));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(60)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert!(store.is_empty().await);
    assert_eq!(store.purge_expired().await.unwrap(), 0);
}
