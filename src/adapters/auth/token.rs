//! Token auth adapter - validates bearer JWTs.
//!
//! Keys come from one of three places:
//!
//! 1. A shared `secret` (HS256/384/512)
//! 2. A `public_key_pem` (RS*, PS* or ES*)
//! 3. A `jwks_url`, fetched lazily and cached for `jwks_cache_ttl_secs`
//!
//! Every token must carry a valid signature, the configured `iss` and `aud`,
//! and an `exp` in the future. Anything else is a rejection, not an error.
//! Only a JWKS endpoint that cannot be fetched is reported as unavailable.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::TokenAuthSettings;
use crate::domain::auth::{AuthIdentity, ConfigurationError, Credentials};
use crate::domain::foundation::{AccessLevel, AuthId, DEFAULT_ACCESS, NO_ACCESS};
use crate::ports::{AdapterError, AuthAdapter, CredentialCheck};

pub const TOKEN_ADAPTER_ID: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

fn family(algorithm: Algorithm) -> KeyFamily {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
        Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
        Algorithm::EdDSA => KeyFamily::Ed,
        _ => KeyFamily::Rsa,
    }
}

/// Cached JWKS with expiry tracking.
struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
}

impl JwksCache {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }
}

enum KeySource {
    Static(DecodingKey),
    Jwks {
        url: String,
        ttl: Duration,
        client: reqwest::Client,
        cache: Arc<RwLock<Option<JwksCache>>>,
    },
}

pub struct TokenAuthAdapter {
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    uid_claim: String,
    level_claim: Option<String>,
    keys: KeySource,
}

impl TokenAuthAdapter {
    pub fn new(settings: &TokenAuthSettings) -> Result<Self, ConfigurationError> {
        if settings.issuer.trim().is_empty() {
            return Err(ConfigurationError::missing("auth.token.issuer"));
        }
        if settings.audience.trim().is_empty() {
            return Err(ConfigurationError::missing("auth.token.audience"));
        }
        if settings.uid_claim.trim().is_empty() {
            return Err(ConfigurationError::missing("auth.token.uid_claim"));
        }

        let algorithms = settings
            .algorithm_names()
            .iter()
            .map(|name| {
                Algorithm::from_str(name).map_err(|_| {
                    ConfigurationError::invalid("auth.token.algorithms", format!("unknown '{}'", name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let Some(&first) = algorithms.first() else {
            return Err(ConfigurationError::invalid("auth.token.algorithms", "empty list"));
        };
        let key_family = family(first);
        if algorithms.iter().any(|alg| family(*alg) != key_family) {
            return Err(ConfigurationError::invalid(
                "auth.token.algorithms",
                "algorithms must share one key type",
            ));
        }

        let keys = Self::key_source(settings, key_family)?;

        Ok(Self {
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            algorithms,
            uid_claim: settings.uid_claim.clone(),
            level_claim: settings.level_claim.clone().filter(|c| !c.trim().is_empty()),
            keys,
        })
    }

    fn key_source(
        settings: &TokenAuthSettings,
        key_family: KeyFamily,
    ) -> Result<KeySource, ConfigurationError> {
        let configured = [
            settings.secret.is_some(),
            settings.public_key_pem.is_some(),
            settings.jwks_url.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if configured != 1 {
            return Err(ConfigurationError::invalid(
                "auth.token",
                "set exactly one of secret, public_key_pem, jwks_url",
            ));
        }

        if let Some(secret) = &settings.secret {
            if key_family != KeyFamily::Hmac {
                return Err(ConfigurationError::invalid(
                    "auth.token.secret",
                    "a shared secret needs HS* algorithms",
                ));
            }
            return Ok(KeySource::Static(DecodingKey::from_secret(
                secret.expose_secret().as_bytes(),
            )));
        }

        if let Some(pem) = &settings.public_key_pem {
            let pem = pem.as_bytes();
            let key = match key_family {
                KeyFamily::Rsa => DecodingKey::from_rsa_pem(pem),
                KeyFamily::Ec => DecodingKey::from_ec_pem(pem),
                KeyFamily::Ed => DecodingKey::from_ed_pem(pem),
                KeyFamily::Hmac => {
                    return Err(ConfigurationError::invalid(
                        "auth.token.public_key_pem",
                        "HS* algorithms need a shared secret",
                    ))
                }
            }
            .map_err(|e| ConfigurationError::invalid("auth.token.public_key_pem", e.to_string()))?;
            return Ok(KeySource::Static(key));
        }

        let url = settings.jwks_url.clone().unwrap_or_default();
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigurationError::invalid(
                "auth.token.jwks_url",
                "expected an http(s) URL",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ConfigurationError::invalid("auth.token.jwks_url", e.to_string()))?;
        Ok(KeySource::Jwks {
            url,
            ttl: settings.jwks_cache_ttl(),
            client,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    async fn fetch_jwks(client: &reqwest::Client, url: &str) -> Result<JwkSet, AdapterError> {
        tracing::debug!("Fetching JWKS from {}", url);

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| AdapterError::unavailable(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AdapterError::unavailable(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AdapterError::unavailable(format!("Failed to parse JWKS: {}", e)))?;
        tracing::debug!("Fetched {} keys from JWKS", jwks.keys.len());
        Ok(jwks)
    }

    /// Decoding key for `header`, from the static key or the (cached) JWKS.
    ///
    /// `Ok(None)` means the token names no usable key.
    async fn decoding_key(&self, header: &Header) -> Result<Option<DecodingKey>, AdapterError> {
        let (url, ttl, client, cache) = match &self.keys {
            KeySource::Static(key) => return Ok(Some(key.clone())),
            KeySource::Jwks {
                url,
                ttl,
                client,
                cache,
            } => (url, *ttl, client, cache),
        };
        let Some(kid) = header.kid.as_deref() else {
            tracing::debug!("JWT missing 'kid' header");
            return Ok(None);
        };

        {
            let cached = cache.read().await;
            if let Some(entry) = cached.as_ref().filter(|c| !c.is_expired(ttl)) {
                if let Some(jwk) = entry.jwks.find(kid) {
                    return Ok(DecodingKey::from_jwk(jwk).ok());
                }
            }
        }

        // miss, expiry or an unknown kid after key rotation
        let jwks = Self::fetch_jwks(client, url).await?;
        let key = jwks.find(kid).and_then(|jwk| DecodingKey::from_jwk(jwk).ok());
        *cache.write().await = Some(JwksCache {
            jwks,
            fetched_at: Instant::now(),
        });
        Ok(key)
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.algorithms = vec![algorithm];
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation
    }

    fn identity_from_claims(&self, claims: &Value) -> Option<AuthIdentity> {
        let uid = match claims.get(&self.uid_claim)? {
            Value::String(s) if !s.is_empty() => Value::String(s.clone()),
            Value::Number(n) => Value::Number(n.clone()),
            _ => return None,
        };
        let identity = AuthIdentity::new(AuthId::new(uid));

        let Some(level_claim) = &self.level_claim else {
            return Some(identity.with_level(DEFAULT_ACCESS));
        };
        let level = match claims.get(level_claim) {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| AccessLevel::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Some(identity.with_level(level.unwrap_or(NO_ACCESS)))
    }
}

#[async_trait]
impl AuthAdapter for TokenAuthAdapter {
    fn identifier(&self) -> &str {
        TOKEN_ADAPTER_ID
    }

    async fn check_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<CredentialCheck, AdapterError> {
        let Credentials::Token(token) = credentials else {
            return Ok(CredentialCheck::Rejected);
        };
        let token = token.expose_secret().trim();

        let header = match decode_header(token) {
            Ok(header) => header,
            Err(e) => {
                tracing::debug!("Failed to decode JWT header: {}", e);
                return Ok(CredentialCheck::Rejected);
            }
        };
        if !self.algorithms.contains(&header.alg) {
            tracing::debug!(alg = ?header.alg, "JWT algorithm not allowed");
            return Ok(CredentialCheck::Rejected);
        }

        let Some(key) = self.decoding_key(&header).await? else {
            return Ok(CredentialCheck::Rejected);
        };

        let claims = match decode::<Value>(token, &key, &self.validation(header.alg)) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Token validation failed: {}", e);
                return Ok(CredentialCheck::Rejected);
            }
        };

        Ok(match self.identity_from_claims(&claims) {
            Some(identity) => CredentialCheck::Accepted(identity),
            None => CredentialCheck::Rejected,
        })
    }

    async fn access_level(&self, identity: &AuthIdentity) -> AccessLevel {
        identity.level.unwrap_or(DEFAULT_ACCESS)
    }
}

impl std::fmt::Debug for TokenAuthAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthAdapter")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithms", &self.algorithms)
            .finish_non_exhaustive()
    }
}
