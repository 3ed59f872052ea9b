//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a visitor's server-side session.
///
/// Generated server-side only. Ids presented by a client are never adopted
/// unless a stored session already exists under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a SessionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier an adapter resolved for an authenticated user.
///
/// Adapters disagree on what a user id looks like: a database adapter
/// returns the uid column (text or integer), a token adapter returns a
/// claim, the mock adapter records the credential object itself. The
/// value is kept as JSON so every shape survives the session round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthId(Value);

impl AuthId {
    /// Wraps any JSON value as an identifier.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice when it is a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Returns the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the id, returning the raw JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl fmt::Display for AuthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for AuthId {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for AuthId {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<i64> for AuthId {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<Value> for AuthId {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_id_generates_unique_values() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn session_id_parses_from_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn session_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn auth_id_displays_strings_without_quotes() {
        assert_eq!(AuthId::from("alice").to_string(), "alice");
        assert_eq!(AuthId::from(42).to_string(), "42");
    }

    #[test]
    fn auth_id_keeps_object_shape() {
        let id = AuthId::new(json!({"username": "testusername"}));
        assert_eq!(id.as_value()["username"], "testusername");
        assert!(id.as_str().is_none());
    }

    #[test]
    fn auth_id_serializes_transparently() {
        let id = AuthId::from("u-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u-1\"");
    }
}
