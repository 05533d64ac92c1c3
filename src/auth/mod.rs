// src/auth/mod.rs
//! Sign-in exchange: a verified identity-provider token becomes a session JWT.

pub mod firebase;
pub mod token;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

pub use firebase::FirebaseVerifier;
pub use token::{SessionSigner, SESSION_TTL_DAYS};

/// Decoded claims of a verified identity token.
pub type Claims = Map<String, Value>;

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<Claims>;
    fn name(&self) -> &'static str;
}

pub type DynIdentityVerifier = Arc<dyn IdentityVerifier>;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Claims,
}

pub struct AuthService {
    verifier: DynIdentityVerifier,
    signer: SessionSigner,
}

impl AuthService {
    pub fn new(verifier: DynIdentityVerifier, signer: SessionSigner) -> Self {
        Self { verifier, signer }
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    pub async fn exchange(&self, id_token: &str) -> Result<Session> {
        let user = self.verifier.verify(id_token).await?;
        let token = self.signer.sign(&user)?;
        let uid = subject(&user);
        info!(provider = self.verifier.name(), %uid, "session issued");
        Ok(Session { token, user })
    }
}

/// Firebase puts the uid in `user_id`; plain OIDC tokens only carry `sub`.
fn subject(claims: &Claims) -> &str {
    claims
        .get("user_id")
        .or_else(|| claims.get("sub"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("?")
}
