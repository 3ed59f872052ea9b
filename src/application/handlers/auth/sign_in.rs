//! SignInHandler - Command handler for the sign-in form.

use crate::application::{AuthContext, AuthError, AuthOutcome};
use crate::domain::auth::Credentials;
use crate::domain::routing::Route;
use crate::domain::session::Session;

/// Submission from the sign-in page or an API client.
#[derive(Debug)]
pub struct SignInCommand {
    pub credentials: Credentials,
}

impl SignInCommand {
    pub fn from_form(user: &str, pass: &str) -> Self {
        Self {
            credentials: Credentials::from_form(user, pass),
        }
    }

    pub fn from_token(token: &str) -> Self {
        Self {
            credentials: Credentials::token(token.trim()),
        }
    }
}

/// Where to send the visitor after the attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInResult {
    pub outcome: AuthOutcome,
    pub redirect_to: Route,
}

/// Handler for sign-in attempts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignInHandler;

impl SignInHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        ctx: &mut AuthContext,
        session: &mut Session,
        cmd: SignInCommand,
    ) -> Result<SignInResult, AuthError> {
        let outcome = ctx.do_auth(session, &cmd.credentials).await?;

        let redirect_to = if outcome.is_authenticated() {
            ctx.policy().index_route.clone()
        } else {
            ctx.policy().unauthenticated_route.clone()
        };

        Ok(SignInResult {
            outcome,
            redirect_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockAuthAdapter;
    use crate::domain::routing::RoutePolicy;
    use chrono::Duration;
    use std::sync::Arc;

    fn context() -> AuthContext {
        let adapter = MockAuthAdapter::new().with_user("alice", "s3cret");
        AuthContext::new(Arc::new(adapter), RoutePolicy::default())
    }

    #[tokio::test]
    async fn success_redirects_to_index() {
        let mut ctx = context();
        let mut session = Session::new(Duration::minutes(5));

        let result = SignInHandler::new()
            .handle(&mut ctx, &mut session, SignInCommand::from_form(" alice", "s3cret"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AuthOutcome::Authenticated);
        assert_eq!(result.redirect_to.to_string(), "/index/index");
    }

    #[tokio::test]
    async fn failure_redirects_back_to_signin() {
        let mut ctx = context();
        let mut session = Session::new(Duration::minutes(5));

        let result = SignInHandler::new()
            .handle(&mut ctx, &mut session, SignInCommand::from_form("alice", "wrong"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AuthOutcome::Rejected);
        assert_eq!(result.redirect_to.to_string(), "/account/signin");
        assert_eq!(ctx.message(), "Authentication Failed");
    }

    #[tokio::test]
    async fn token_command_is_checked_as_a_token() {
        let adapter = MockAuthAdapter::new().with_token("opaque-token", "alice");
        let mut ctx = AuthContext::new(Arc::new(adapter), RoutePolicy::default());
        let mut session = Session::new(Duration::minutes(5));

        let cmd = SignInCommand::from_token(" opaque-token\n");
        assert!(matches!(cmd.credentials, Credentials::Token(_)));
        let result = SignInHandler::new()
            .handle(&mut ctx, &mut session, cmd)
            .await
            .unwrap();

        assert_eq!(result.outcome, AuthOutcome::Authenticated);
    }
}
