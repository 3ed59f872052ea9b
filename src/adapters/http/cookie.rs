//! Signed session cookie.
//!
//! The cookie value is `{session_id}.{hex(hmac_sha256(secret, session_id))}`.
//! A value whose signature does not verify is treated as no cookie at all.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::SessionId;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SessionCookie {
    name: String,
    secret: SecretString,
    secure: bool,
    max_age_secs: i64,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secret: SecretString) -> Self {
        Self {
            name: name.into(),
            secret,
            secure: false,
            max_age_secs: 0,
        }
    }

    /// Adds the `Secure` attribute (production).
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Adds `Max-Age`. Zero keeps it a browser-session cookie.
    pub fn max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self, id: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(id.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    pub fn sign(&self, id: &SessionId) -> String {
        let id = id.to_string();
        let signature = hex::encode(self.signature(&id));
        format!("{}.{}", id, signature)
    }

    /// Returns the session id if `value` carries a valid signature.
    pub fn verify(&self, value: &str) -> Option<SessionId> {
        let (id, signature) = value.rsplit_once('.')?;
        let provided = hex::decode(signature).ok()?;
        let expected = self.signature(id);
        if provided.len() != expected.len() || expected.ct_eq(&provided).unwrap_u8() != 1 {
            tracing::debug!("Session cookie signature mismatch");
            return None;
        }
        id.parse().ok()
    }

    /// Session id from the request's `Cookie` headers, if present and valid.
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, value)| self.verify(value))
    }

    /// `Set-Cookie` value for `id`.
    pub fn header_value(&self, id: &SessionId) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.name,
            self.sign(id)
        );
        if self.max_age_secs > 0 {
            cookie.push_str(&format!("; Max-Age={}", self.max_age_secs));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }

    /// Appends a `Set-Cookie` header for `id`.
    pub fn set(&self, headers: &mut HeaderMap, id: &SessionId) {
        match self.header_value(id) {
            Some(value) => {
                headers.append(SET_COOKIE, value);
            }
            None => tracing::error!(cookie = %self.name, "Session cookie is not a valid header"),
        }
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}
