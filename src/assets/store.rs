// src/assets/store.rs
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use super::signing::UrlSigner;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool>;
    /// Credential-free read URL valid for `ttl`.
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String>;
    fn name(&self) -> &'static str;
}

pub type DynObjectStore = Arc<dyn ObjectStore>;

/// Object store rooted in a local directory. Signed URLs point back at this service's
/// `/api/assets/...` route, which checks them with the same [`UrlSigner`].
pub struct FsObjectStore {
    root: PathBuf,
    public_base: String,
    signer: UrlSigner,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>, signer: UrlSigner) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
            signer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    pub fn object_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Local file for a signed request, or `None` when the signature is bad or expired.
    pub fn authorize(&self, path: &str, expires: i64, sig: &str, now: i64) -> Option<PathBuf> {
        self.signer
            .verify(path, expires, sig, now)
            .then(|| self.object_path(path))
    }
}

/// Percent-encode each `/`-separated segment of `path`.
fn encode_path(path: &str) -> Result<String> {
    let mut url = Url::parse("http://localhost/").context("encode base")?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("cannot-be-a-base url"))?
        .pop_if_empty()
        .extend(path.split('/'));
    Ok(url.path().trim_start_matches('/').to_string())
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn exists(&self, path: &str) -> Result<bool> {
        match tokio::fs::metadata(self.object_path(path)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("stat {path}")),
        }
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String> {
        if !self.signer.is_configured() {
            bail!("asset signing secret not configured");
        }
        let expires = chrono::Utc::now().timestamp() + ttl.as_secs() as i64;
        let sig = self.signer.signature(path, expires);
        Ok(format!(
            "{}/{}?expires={expires}&sig={sig}",
            self.public_base,
            encode_path(path)?
        ))
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}
