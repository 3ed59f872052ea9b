//! Request-scoped authentication state.
//!
//! An [`AuthContext`] is rebuilt from the visitor's session at the start of
//! every request, mutated by the operations below and written back into the
//! session under [`AUTH_SESSION_KEY`]. There is no process-wide auth state.

use std::sync::Arc;

use crate::application::AuthError;
use crate::domain::auth::{
    AuthIdentity, AuthRecord, AuthStatus, ConfigurationError, Credentials, AUTH_SESSION_KEY,
    MSG_AUTH_FAILED, MSG_AUTH_SUCCESS, MSG_LOGGED_OUT,
};
use crate::domain::foundation::{AccessLevel, AuthId, NO_ACCESS};
use crate::domain::routing::{Route, RoutePolicy};
use crate::domain::session::Session;
use crate::ports::{AdapterError, AuthAdapter, CredentialCheck};

/// Result of a sign-in attempt that did not hit a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Rejected,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }
}

pub struct AuthContext {
    adapter: Arc<dyn AuthAdapter>,
    policy: RoutePolicy,
    record: AuthRecord,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("adapter", &self.adapter.identifier())
            .field("status", &self.record.status)
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    /// Fresh anonymous context bound to `adapter`.
    pub fn new(adapter: Arc<dyn AuthAdapter>, policy: RoutePolicy) -> Self {
        let record = AuthRecord::anonymous(adapter.identifier());
        Self {
            adapter,
            policy,
            record,
        }
    }

    /// Rebuilds the context from the record stored in `session`.
    ///
    /// A record written by a different adapter is discarded and the visitor
    /// starts anonymous. A record that no longer deserializes is an error.
    pub fn restore(
        session: &Session,
        adapter: Arc<dyn AuthAdapter>,
        policy: RoutePolicy,
    ) -> Result<Self, AuthError> {
        let mut ctx = Self::new(adapter, policy);
        let Some(mut record) = session.get::<AuthRecord>(AUTH_SESSION_KEY)? else {
            return Ok(ctx);
        };

        if record.adapter != ctx.adapter.identifier() {
            tracing::warn!(
                session_id = %session.id(),
                stored = %record.adapter,
                bound = %ctx.adapter.identifier(),
                "Auth record belongs to another adapter, starting anonymous"
            );
            return Ok(ctx);
        }

        // a check that never finished counts as not signed in
        if record.status == AuthStatus::Authenticating {
            record.sign_out(MSG_AUTH_FAILED);
        }

        ctx.record = record;
        Ok(ctx)
    }

    /// Runs the bound adapter against `credentials` and records the result.
    ///
    /// The record is persisted into `session` whatever happens. On success
    /// the session id is rotated.
    pub async fn do_auth(
        &mut self,
        session: &mut Session,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        self.record.begin_check()?;

        let username = credentials.username().unwrap_or("<token>");
        let result = self.adapter.check_credentials(credentials).await;

        let outcome = match result {
            Ok(CredentialCheck::Accepted(identity)) => {
                match self.record.accept(identity, MSG_AUTH_SUCCESS) {
                    Ok(()) => {
                        session.regenerate_id();
                        tracing::info!(
                            username,
                            adapter = %self.adapter.identifier(),
                            "Sign-in succeeded"
                        );
                        Ok(AuthOutcome::Authenticated)
                    }
                    Err(e) => {
                        self.record.sign_out(MSG_AUTH_FAILED);
                        Err(AuthError::InvalidState(e))
                    }
                }
            }
            Ok(CredentialCheck::Rejected) => {
                self.record.sign_out(MSG_AUTH_FAILED);
                tracing::warn!(
                    username,
                    adapter = %self.adapter.identifier(),
                    "Credentials rejected"
                );
                Ok(AuthOutcome::Rejected)
            }
            Err(AdapterError::Unavailable(reason)) => {
                self.record.sign_out(MSG_AUTH_FAILED);
                tracing::warn!(
                    username,
                    adapter = %self.adapter.identifier(),
                    %reason,
                    "Auth backend unavailable, treating as rejected"
                );
                Ok(AuthOutcome::Rejected)
            }
            Err(AdapterError::Misconfigured(reason)) => {
                self.record.sign_out(MSG_AUTH_FAILED);
                tracing::error!(
                    adapter = %self.adapter.identifier(),
                    %reason,
                    "Auth adapter misconfigured"
                );
                Err(AuthError::Configuration(
                    ConfigurationError::AdapterMisconfigured {
                        adapter: self.adapter.identifier().to_string(),
                        reason,
                    },
                ))
            }
        };

        self.record.submitted = false;
        self.persist(session)?;
        outcome
    }

    pub fn is_authed(&self) -> bool {
        self.record.is_authed()
    }

    /// Message from the last auth operation, empty for a fresh visitor.
    pub fn message(&self) -> &str {
        &self.record.message
    }

    pub fn auth_id(&self) -> Option<&AuthId> {
        if !self.is_authed() {
            return None;
        }
        self.record.identity.as_ref().map(|identity| &identity.id)
    }

    pub fn identity(&self) -> Option<&AuthIdentity> {
        if !self.is_authed() {
            return None;
        }
        self.record.identity.as_ref()
    }

    /// True while the current request's credentials are being checked.
    pub fn submitted(&self) -> bool {
        self.record.submitted
    }

    pub fn record(&self) -> &AuthRecord {
        &self.record
    }

    pub fn adapter(&self) -> &Arc<dyn AuthAdapter> {
        &self.adapter
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Level of the signed-in visitor, `0` when anonymous.
    pub async fn access_level(&self) -> AccessLevel {
        match self.identity() {
            Some(identity) => self.adapter.access_level(identity).await,
            None => NO_ACCESS,
        }
    }

    /// Decides where to send a visitor who lacks authentication for
    /// `attempted`.
    ///
    /// Fails with `RedirectLoop` when `attempted` is the same route as the
    /// previous failed attempt, unless it is the unauthenticated route
    /// itself. Otherwise remembers `attempted` and returns the redirect
    /// target.
    pub fn no_auth(
        &mut self,
        session: &mut Session,
        attempted: &Route,
        fallback: Option<Route>,
    ) -> Result<Route, AuthError> {
        let repeated = self
            .record
            .last_attempted_route
            .as_ref()
            .is_some_and(|last| last.same_target(attempted));

        if repeated && !self.policy.is_unauthenticated_route(attempted) {
            tracing::warn!(
                session_id = %session.id(),
                route = %attempted,
                "Auth redirect loop detected"
            );
            return Err(AuthError::RedirectLoop {
                route: attempted.clone(),
            });
        }

        self.record.last_attempted_route = Some(attempted.clone());
        self.persist(session)?;
        Ok(fallback.unwrap_or_else(|| self.policy.unauthenticated_route.clone()))
    }

    /// Forgets the last attempted route once the visitor has landed on the
    /// unauthenticated route, so a later visit to the same route redirects
    /// again instead of tripping the loop guard.
    pub fn clear_attempted_route(&mut self, session: &mut Session) -> Result<(), AuthError> {
        if self.record.last_attempted_route.take().is_some() {
            self.persist(session)?;
        }
        Ok(())
    }

    /// Signs the visitor out. Calling it again leaves the same state.
    pub async fn clear_auth(&mut self, session: &mut Session) -> Result<(), AuthError> {
        let reset = self.adapter.reset(self.record.identity.as_ref()).await;
        if !reset {
            tracing::warn!(
                adapter = %self.adapter.identifier(),
                "Adapter reset reported failure"
            );
        }
        if self.record.is_authed() {
            tracing::info!(session_id = %session.id(), "Signed out");
        }
        self.record.sign_out(MSG_LOGGED_OUT);
        self.persist(session)
    }

    /// Signs the visitor out and optionally binds a different adapter.
    pub async fn reset_auth(
        &mut self,
        session: &mut Session,
        adapter: Option<Arc<dyn AuthAdapter>>,
    ) -> Result<(), AuthError> {
        self.clear_auth(session).await?;
        if let Some(adapter) = adapter {
            self.record.adapter = adapter.identifier().to_string();
            self.adapter = adapter;
            self.persist(session)?;
        }
        Ok(())
    }

    /// Returns true if the signed-in visitor may open `route`.
    pub async fn authorize_route(&self, route: &Route, required_level: AccessLevel) -> bool {
        let Some(identity) = self.identity() else {
            return false;
        };
        if self.adapter.access_level(identity).await < required_level {
            return false;
        }
        self.adapter
            .authorize_route(route, required_level, identity)
            .await
    }

    /// Writes the record into `session`.
    pub fn persist(&self, session: &mut Session) -> Result<(), AuthError> {
        session.insert(AUTH_SESSION_KEY, &self.record)?;
        Ok(())
    }
}
