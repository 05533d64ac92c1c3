// src/providers/mod.rs
//! Thin adapters over the third-party HTTP APIs. Adapters report failures as errors;
//! deciding what to fall back to is the resolvers' job.

pub mod groq;
pub mod mapbox;
pub mod pexels;
pub mod unsplash;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::Coordinates;

const USER_AGENT: &str = "travel-guide/0.1";

/// Shared reqwest client used by every adapter.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4).min(timeout))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// One image search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSearch {
    pub query: String,
    pub per_page: u32,
    /// 1-based result page; provider default when `None`.
    pub page: Option<u32>,
    pub landscape: bool,
}

impl ImageSearch {
    pub fn new(query: impl Into<String>, per_page: u32) -> Self {
        Self {
            query: query.into(),
            per_page,
            page: None,
            landscape: false,
        }
    }

    pub fn landscape(mut self) -> Self {
        self.landscape = true;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Candidate image URLs in provider order. Empty when nothing matched.
    async fn search(&self, req: &ImageSearch) -> Result<Vec<String>>;
    fn name(&self) -> &'static str;
}

pub type DynImageProvider = Arc<dyn ImageProvider>;

#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    /// Short name, e.g. "Hawa Mahal".
    pub text: String,
    /// Full formatted address.
    pub place_name: String,
    pub center: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeocodeQuery {
    pub query: String,
    pub limit: Option<u32>,
    pub proximity: Option<Coordinates>,
}

impl GeocodeQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn near(mut self, center: Coordinates) -> Self {
        self.proximity = Some(center);
        self
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn forward(&self, q: &GeocodeQuery) -> Result<Vec<GeoFeature>>;
    fn name(&self) -> &'static str;
}

pub type DynGeocoder = Arc<dyn Geocoder>;

/// Generative text endpoint. Returns the raw text of the first choice (possibly empty).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}

pub type DynCompletionClient = Arc<dyn CompletionClient>;
