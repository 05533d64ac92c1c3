// src/auth/token.rs
use anyhow::{bail, Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;

use super::Claims;

pub const SESSION_TTL_DAYS: i64 = 7;

/// HS256 session tokens carrying the verified identity claims.
#[derive(Clone)]
pub struct SessionSigner {
    secret: String,
    ttl: chrono::Duration,
}

impl SessionSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: chrono::Duration::days(SESSION_TTL_DAYS),
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Re-sign `claims` with a fresh `iat`/`exp`; every other claim is kept as-is.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        if self.secret.is_empty() {
            bail!("JWT_SECRET not configured");
        }
        let now = chrono::Utc::now();
        let mut body = claims.clone();
        body.insert("iat".into(), Value::from(now.timestamp()));
        body.insert("exp".into(), Value::from((now + self.ttl).timestamp()));

        encode(
            &Header::new(Algorithm::HS256),
            &body,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("signing session token")
    }

    /// Check signature and expiry of a session token issued by [`sign`](Self::sign).
    pub fn decode(&self, token: &str) -> Result<Claims> {
        if self.secret.is_empty() {
            bail!("JWT_SECRET not configured");
        }
        let mut validation = Validation::new(Algorithm::HS256);
        // identity tokens carry the provider's `aud`; it is not ours to check here
        validation.validate_aud = false;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .context("decoding session token")?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret_len", &self.secret.len())
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}
