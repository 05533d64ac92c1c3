// src/assets/mod.rs
//! Asset gateway: storage path -> browsable image URL.
//!
//! Stored objects get a short-lived signed URL. Missing objects fall back to one
//! primary-provider search keyed by the file name, then to a static image.

pub mod signing;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{AssetReference, AssetSource};
use crate::providers::ImageSearch;
use crate::resolve::{ImageResolver, Pick};

pub use signing::UrlSigner;
pub use store::{DynObjectStore, FsObjectStore, ObjectStore};

pub const SIGNED_URL_TTL: Duration = Duration::from_secs(10 * 60);
pub const ASSET_FALLBACK_URL: &str = "https://images.unsplash.com/photo-1507525428034-b723cf961d3e";

const FALLBACK_PER_PAGE: u32 = 20;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Missing file path")]
    MissingPath,

    #[error("Invalid file path")]
    InvalidPath,

    #[error("{0:#}")]
    Storage(anyhow::Error),
}

/// Reject empty, absolute and parent-escaping paths.
pub fn validate_storage_path(path: &str) -> Result<&str, AssetError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(AssetError::MissingPath);
    }
    let escapes = path.starts_with('/')
        || path.contains('\\')
        || path.contains('\0')
        || path.split('/').any(|seg| seg == ".." || seg == "." || seg.is_empty());
    if escapes {
        return Err(AssetError::InvalidPath);
    }
    Ok(path)
}

/// Search term from a storage path: last segment, cut at the first `.`, percent-decoded.
/// `trips/popular/New%20Delhi.jpg` -> `New Delhi`.
pub fn search_term_from_path(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.split('.').next().unwrap_or(file);
    percent_decode(stem)
}

// Malformed escapes are kept verbatim.
fn percent_decode(s: &str) -> String {
    fn hex(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub struct AssetGateway {
    store: DynObjectStore,
    images: Arc<ImageResolver>,
    ttl: Duration,
    fallback_url: String,
}

impl AssetGateway {
    pub fn new(store: DynObjectStore, images: Arc<ImageResolver>) -> Self {
        Self {
            store,
            images,
            ttl: SIGNED_URL_TTL,
            fallback_url: ASSET_FALLBACK_URL.to_string(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    pub async fn resolve(&self, storage_path: &str) -> Result<AssetReference, AssetError> {
        let path = validate_storage_path(storage_path)?;

        let exists = self.store.exists(path).await.map_err(AssetError::Storage)?;
        let (resolved_url, source) = if exists {
            let url = self
                .store
                .signed_url(path, self.ttl)
                .await
                .map_err(AssetError::Storage)?;
            (url, AssetSource::Stored)
        } else {
            let term = search_term_from_path(path);
            warn!(%path, %term, store = self.store.name(), "object not in store; searching images");
            let search = ImageSearch::new(format!("{term} city travel"), FALLBACK_PER_PAGE).landscape();
            match self
                .images
                .lookup(self.images.primary().as_ref(), &search, Pick::First)
                .await
                .url()
            {
                Some(url) => (url, AssetSource::FallbackSearch),
                None => (self.fallback_url.clone(), AssetSource::StaticPlaceholder),
            }
        };

        counter!("asset_resolve_total", "source" => source.as_str()).increment(1);
        info!(%path, source = source.as_str(), "asset resolved");

        Ok(AssetReference {
            storage_path: path.to_string(),
            resolved_url,
            source,
        })
    }
}
