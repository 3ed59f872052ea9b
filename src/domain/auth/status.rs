//! Authentication status state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a visitor's session stands with the auth gate.
///
/// ```text
/// Anonymous ──do_auth──▶ Authenticating ──accepted──▶ Authenticated
///     ▲                        │                          │
///     └────────rejected────────┘◀────────clear_auth───────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Anonymous,
    /// Only observable while a credential check is in flight.
    Authenticating,
    Authenticated,
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated)
    }
}

impl StateMachine for AuthStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AuthStatus::*;
        matches!(
            (self, target),
            (Anonymous, Authenticating)
                | (Authenticating, Authenticated)
                | (Authenticating, Anonymous)
                | (Authenticated, Anonymous)
                | (Authenticated, Authenticating)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AuthStatus::*;
        match self {
            Anonymous => vec![Authenticating],
            Authenticating => vec![Authenticated, Anonymous],
            Authenticated => vec![Anonymous, Authenticating],
        }
    }
}
