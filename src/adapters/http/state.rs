//! Shared state for the HTTP surface.

use std::sync::Arc;

use crate::application::{AuthContext, AuthError, SessionManager};
use crate::domain::routing::RoutePolicy;
use crate::domain::session::Session;
use crate::ports::AuthAdapter;

use super::cookie::SessionCookie;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub adapter: Arc<dyn AuthAdapter>,
    pub policy: RoutePolicy,
    pub cookie: SessionCookie,
    /// Include error details in error pages (developer mode).
    pub verbose_errors: bool,
}

impl AppState {
    pub fn new(
        sessions: SessionManager,
        adapter: Arc<dyn AuthAdapter>,
        policy: RoutePolicy,
        cookie: SessionCookie,
    ) -> Self {
        Self {
            sessions,
            adapter,
            policy,
            cookie,
            verbose_errors: false,
        }
    }

    pub fn with_verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    /// Auth context for the visitor owning `session`.
    pub fn auth_context(&self, session: &Session) -> Result<AuthContext, AuthError> {
        AuthContext::restore(session, self.adapter.clone(), self.policy.clone())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("adapter", &self.adapter.identifier())
            .field("policy", &self.policy)
            .field("cookie", &self.cookie)
            .field("verbose_errors", &self.verbose_errors)
            .finish_non_exhaustive()
    }
}
