//! SignOutHandler - Command handler for signing out.

use crate::application::{AuthContext, AuthError};
use crate::domain::routing::Route;
use crate::domain::session::Session;

/// Handler for sign-out requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignOutHandler;

impl SignOutHandler {
    pub fn new() -> Self {
        Self
    }

    /// Clears authentication and returns the route to show next.
    pub async fn handle(
        &self,
        ctx: &mut AuthContext,
        session: &mut Session,
    ) -> Result<Route, AuthError> {
        ctx.clear_auth(session).await?;
        // new id so the signed-out session cannot be replayed
        session.regenerate_id();
        Ok(ctx.policy().unauthenticated_route.clone())
    }
}
