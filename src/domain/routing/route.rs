//! Route value type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

const DEFAULT_SEGMENT: &str = "index";

/// A dispatch target: controller, action and positional parameters.
///
/// Two routes point at the same target when controller and action match;
/// parameters are ignored for that comparison (see [`Route::same_target`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    controller: String,
    action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<String>,
}

impl Route {
    /// Creates a route, validating and normalising both segments.
    pub fn new(
        controller: impl AsRef<str>,
        action: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            controller: normalise("controller", controller.as_ref())?,
            action: normalise("action", action.as_ref())?,
            params: Vec::new(),
        })
    }

    /// Appends a positional parameter.
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Parses a path like `/account/signin/extra`.
    ///
    /// Missing controller or action default to `index`, so `/` is `index/index`
    /// and `/account` is `account/index`. The query string is ignored.
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        let controller = segments.next().unwrap_or(DEFAULT_SEGMENT);
        let action = segments.next().unwrap_or(DEFAULT_SEGMENT);
        let mut route = Self::new(controller, action)?;

        for param in segments {
            if !is_valid_segment(param) {
                return Err(ValidationError::invalid_format(
                    "param",
                    format!("unsupported characters in '{}'", param),
                ));
            }
            route.params.push(param.to_string());
        }

        Ok(route)
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns true when both routes dispatch to the same controller action.
    pub fn same_target(&self, other: &Route) -> bool {
        self.controller == other.controller && self.action == other.action
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.controller, self.action)?;
        for param in &self.params {
            write!(f, "/{}", param)?;
        }
        Ok(())
    }
}

impl FromStr for Route {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn normalise(field: &str, segment: &str) -> Result<String, ValidationError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if !is_valid_segment(segment) {
        return Err(ValidationError::invalid_format(
            field,
            format!("unsupported characters in '{}'", segment),
        ));
    }
    Ok(segment.to_ascii_lowercase())
}

fn is_valid_segment(segment: &str) -> bool {
    segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_fills_in_index_defaults() {
        assert_eq!(Route::parse("/").unwrap().to_string(), "/index/index");
        assert_eq!(Route::parse("/account").unwrap().to_string(), "/account/index");
        assert_eq!(Route::parse("").unwrap().to_string(), "/index/index");
    }

    #[test]
    fn parse_lowercases_controller_and_action() {
        let route = Route::parse("/Account/SignIn").unwrap();
        assert_eq!(route.controller(), "account");
        assert_eq!(route.action(), "signin");
    }

    #[test]
    fn parse_keeps_params_and_drops_query() {
        let route = Route::parse("/report/view/42/Summary?x=1").unwrap();
        assert_eq!(route.params(), ["42", "Summary"]);
        assert_eq!(route.to_string(), "/report/view/42/Summary");
    }

    #[test]
    fn parse_rejects_traversal_and_markup() {
        assert!(Route::parse("/../etc").is_err());
        assert!(Route::parse("/account/<script>").is_err());
        assert!(Route::parse("/account/signin/a.b").is_err());
    }

    #[test]
    fn new_rejects_empty_segments() {
        assert_eq!(
            Route::new("", "index"),
            Err(ValidationError::empty_field("controller"))
        );
    }

    #[test]
    fn same_target_ignores_params() {
        let a = Route::new("report", "view").unwrap().with_param("1");
        let b = Route::new("report", "view").unwrap().with_param("2");
        let c = Route::new("report", "edit").unwrap();
        assert!(a.same_target(&b));
        assert_ne!(a, b);
        assert!(!a.same_target(&c));
    }

    #[test]
    fn serde_omits_empty_params() {
        let route = Route::new("account", "signin").unwrap();
        let json = serde_json::to_string(&route).unwrap();
        assert_eq!(json, r#"{"controller":"account","action":"signin"}"#);
        let back: Route = serde_json::from_str(&json).unwrap();
        assert_eq!(back, route);
    }

    proptest! {
        #[test]
        fn display_output_parses_back_to_same_route(
            controller in "[a-z][a-z0-9_-]{0,10}",
            action in "[a-z][a-z0-9_-]{0,10}",
            params in proptest::collection::vec("[A-Za-z0-9_-]{1,8}", 0..4),
        ) {
            let mut route = Route::new(&controller, &action).unwrap();
            for p in &params {
                route = route.with_param(p.clone());
            }
            let reparsed = Route::parse(&route.to_string()).unwrap();
            prop_assert_eq!(reparsed, route);
        }
    }
}
