//! Session middleware.
//!
//! Loads the visitor's session before the handler runs and commits it
//! afterwards. Handlers reach it through the [`SessionHandle`] extension.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::{Mutex, MutexGuard};

use crate::adapters::http::error::ErrorPage;
use crate::adapters::http::state::AppState;
use crate::application::AuthError;
use crate::domain::session::Session;

/// Request-scoped access to the current session.
#[derive(Debug, Clone)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().await
    }
}

/// Starts the session, runs the handler, commits, and sets the cookie when
/// a new or rotated session was stored.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = state.cookie.read(request.headers());

    let session = match state.sessions.start(presented).await {
        Ok(session) => session,
        Err(e) => {
            return ErrorPage::from_auth_error(&AuthError::from(e), state.verbose_errors)
                .into_response()
        }
    };

    let handle = SessionHandle::new(session);
    request.extensions_mut().insert(handle.clone());

    let mut response = next.run(request).await;

    let mut session = handle.lock().await;
    match state.sessions.commit(&mut session).await {
        Ok(true) if presented != Some(session.id()) => {
            state.cookie.set(response.headers_mut(), &session.id());
        }
        Ok(_) => {}
        Err(e) => {
            return ErrorPage::from_auth_error(&AuthError::from(e), state.verbose_errors)
                .into_response()
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockAuthAdapter;
    use crate::adapters::http::{app_router, SessionCookie};
    use crate::application::SessionManager;
    use crate::domain::foundation::SessionId;
    use crate::domain::routing::RoutePolicy;
    use crate::domain::session::SessionRecord;
    use crate::ports::{SessionStore, SessionStoreError};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::header::COOKIE;
    use axum::http::{Request as HttpRequest, StatusCode};
    use secrecy::SecretString;
    use std::time::Duration;
    use tower::ServiceExt;

    const BACKEND_DETAIL: &str = "sessions.internal:6379 connection refused";

    /// Every operation fails like an unreachable backend.
    #[derive(Debug)]
    struct UnreachableStore;

    #[async_trait]
    impl SessionStore for UnreachableStore {
        async fn load(&self, _: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
            Err(SessionStoreError::Backend(BACKEND_DETAIL.into()))
        }
        async fn save(
            &self,
            _: &SessionId,
            _: &SessionRecord,
            _: chrono::Duration,
        ) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::Backend(BACKEND_DETAIL.into()))
        }
        async fn destroy(&self, _: &SessionId) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::Backend(BACKEND_DETAIL.into()))
        }
        async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
            Err(SessionStoreError::Backend(BACKEND_DETAIL.into()))
        }
    }

    fn cookie() -> SessionCookie {
        SessionCookie::new(
            "staple_session",
            SecretString::new("session-layer-test-secret".to_string()),
        )
    }

    fn state(verbose: bool) -> AppState {
        let sessions = SessionManager::new(Arc::new(UnreachableStore), chrono::Duration::minutes(5));
        let adapter = MockAuthAdapter::new().with_user("alice", "s3cret");
        AppState::new(sessions, Arc::new(adapter), RoutePolicy::default(), cookie())
            .with_verbose_errors(verbose)
    }

    async fn body_text(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&body).into_owned()
    }

    #[tokio::test]
    async fn failed_commit_renders_generic_500() {
        let app = app_router(state(false), Duration::from_secs(5));

        // anonymous guarded visit writes a breadcrumb, so commit must save
        let response = app
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get("set-cookie").is_none());
        let body = body_text(response).await;
        assert!(body.contains("Something went wrong"));
        assert!(!body.contains(BACKEND_DETAIL));
    }

    #[tokio::test]
    async fn failed_load_renders_generic_500() {
        let app = app_router(state(false), Duration::from_secs(5));
        let presented = format!("staple_session={}", cookie().sign(&SessionId::new()));

        let response = app
            .oneshot(
                HttpRequest::get("/account/status")
                    .header(COOKIE, presented)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("Something went wrong"));
        assert!(!body.contains(BACKEND_DETAIL));
    }

    #[tokio::test]
    async fn verbose_errors_include_store_detail() {
        let app = app_router(state(true), Duration::from_secs(5));

        let response = app
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains(BACKEND_DETAIL));
    }
}
