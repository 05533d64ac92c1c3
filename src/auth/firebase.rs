// src/auth/firebase.rs
//! Firebase ID token verification against Google's published signing keys.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use super::{Claims, IdentityVerifier};

pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

pub struct FirebaseVerifier {
    http: reqwest::Client,
    project_id: String,
    jwks_url: String,
}

impl FirebaseVerifier {
    pub fn new(http: reqwest::Client, project_id: impl Into<String>) -> Self {
        Self {
            http,
            project_id: project_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Keys are fetched on every call; nothing is cached between requests.
    async fn fetch_keys(&self) -> Result<JwkSet> {
        self.http
            .get(&self.jwks_url)
            .send()
            .await
            .context("jwks http get()")?
            .error_for_status()
            .context("jwks status")?
            .json()
            .await
            .context("jwks json")
    }

    pub fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::RS256);
        v.set_audience(&[self.project_id.as_str()]);
        v.set_issuer(&[self.issuer()]);
        v
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, id_token: &str) -> Result<Claims> {
        if self.project_id.is_empty() {
            bail!("FIREBASE_PROJECT_ID not configured");
        }
        if id_token.trim().is_empty() {
            bail!("Missing idToken");
        }

        let header = decode_header(id_token).context("decoding id token header")?;
        let kid = header.kid.ok_or_else(|| anyhow!("id token has no key id"))?;

        let keys = self.fetch_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| anyhow!("no signing key matches kid {kid}"))?;
        let key = DecodingKey::from_jwk(jwk).context("building decoding key")?;

        let data = decode::<Claims>(id_token, &key, &self.validation())
            .context("verifying id token")?;

        match data.claims.get("sub").and_then(Value::as_str) {
            Some(sub) if !sub.is_empty() => Ok(data.claims),
            _ => bail!("id token has an empty subject"),
        }
    }

    fn name(&self) -> &'static str {
        "firebase"
    }
}
