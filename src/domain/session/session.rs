//! Server-side visitor session.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::SessionId;

/// What a session store persists for one session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub data: BTreeMap<String, Value>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Per-visitor key/value bag, loaded at the start of a request and
/// committed at the end of it.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    data: BTreeMap<String, Value>,
    previous_id: Option<SessionId>,
    expires_at: DateTime<Utc>,
    is_new: bool,
    dirty: bool,
}

impl Session {
    /// Creates an empty session under a fresh id.
    pub fn new(ttl: Duration) -> Self {
        Self {
            id: SessionId::new(),
            data: BTreeMap::new(),
            previous_id: None,
            expires_at: Utc::now() + ttl,
            is_new: true,
            dirty: false,
        }
    }

    /// Rebuilds a session from a stored record.
    pub fn from_record(id: SessionId, record: SessionRecord) -> Self {
        Self {
            id,
            data: record.data,
            previous_id: None,
            expires_at: record.expires_at,
            is_new: false,
            dirty: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Id this session was stored under before [`Session::regenerate_id`].
    pub fn previous_id(&self) -> Option<SessionId> {
        self.previous_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True until the session has been committed once.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reads and deserializes a value. Returns `Ok(None)` for missing keys.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.data
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Serializes and stores a value under `key`.
    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.data.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.data.is_empty() {
            self.data.clear();
            self.dirty = true;
        }
    }

    /// Moves the session to a fresh id, keeping its data.
    ///
    /// The first id is remembered so the store can drop it on commit.
    /// Rotating twice in one request still deletes only the original id,
    /// since the intermediate one was never stored.
    pub fn regenerate_id(&mut self) {
        if self.previous_id.is_none() && !self.is_new {
            self.previous_id = Some(self.id);
        }
        self.id = SessionId::new();
        self.dirty = true;
    }

    /// Pushes the expiry out by `ttl` from now.
    pub fn touch(&mut self, ttl: Duration) {
        self.expires_at = Utc::now() + ttl;
    }

    /// Snapshot for the store.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            data: self.data.clone(),
            expires_at: self.expires_at,
        }
    }

    /// Marks the session as stored under its current id.
    pub fn mark_committed(&mut self) {
        self.previous_id = None;
        self.is_new = false;
        self.dirty = false;
    }
}
