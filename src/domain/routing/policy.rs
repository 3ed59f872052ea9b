//! Routing targets used by the authentication gate.

use super::Route;
use crate::domain::foundation::ValidationError;

/// Where the gate sends visitors, and whether it is active at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    /// When false, guarded routes are served without authentication.
    pub enabled: bool,
    /// Target for visitors who fail or lack authentication.
    pub unauthenticated_route: Route,
    /// Target after a successful sign-in.
    pub index_route: Route,
}

impl RoutePolicy {
    pub fn new(enabled: bool, unauthenticated_route: Route, index_route: Route) -> Self {
        Self {
            enabled,
            unauthenticated_route,
            index_route,
        }
    }

    /// Builds a policy from configured path strings.
    pub fn from_paths(
        enabled: bool,
        unauthenticated_route: &str,
        index_route: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            enabled,
            Route::parse(unauthenticated_route)?,
            Route::parse(index_route)?,
        ))
    }

    /// Returns true if `route` is the default unauthenticated target.
    pub fn is_unauthenticated_route(&self, route: &Route) -> bool {
        self.unauthenticated_route.same_target(route)
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            unauthenticated_route: Route::new("account", "signin")
                .expect("static route is valid"),
            index_route: Route::new("index", "index").expect("static route is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_targets_signin_and_index() {
        let policy = RoutePolicy::default();
        assert!(policy.enabled);
        assert_eq!(policy.unauthenticated_route.to_string(), "/account/signin");
        assert_eq!(policy.index_route.to_string(), "/index/index");
    }

    #[test]
    fn from_paths_parses_both_routes() {
        let policy = RoutePolicy::from_paths(false, "/login", "/home/dashboard").unwrap();
        assert!(!policy.enabled);
        assert_eq!(policy.unauthenticated_route.to_string(), "/login/index");
        assert_eq!(policy.index_route.to_string(), "/home/dashboard");
    }

    #[test]
    fn from_paths_rejects_invalid_route() {
        assert!(RoutePolicy::from_paths(true, "/bad route", "/").is_err());
    }

    #[test]
    fn is_unauthenticated_route_compares_target_only() {
        let policy = RoutePolicy::default();
        let with_param = Route::parse("/account/signin/expired").unwrap();
        assert!(policy.is_unauthenticated_route(&with_param));
        assert!(!policy.is_unauthenticated_route(&Route::parse("/account/index").unwrap()));
    }
}
