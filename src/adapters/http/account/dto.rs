//! HTTP DTOs for the account endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::AccessLevel;

/// Sign-in form fields. `token` is used by bearer-token adapters in place
/// of `user` and `pass`.
#[derive(Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub token: String,
}

impl std::fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInForm")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Response for `GET /account/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authed: bool,
    pub message: String,
    pub level: AccessLevel,
}
