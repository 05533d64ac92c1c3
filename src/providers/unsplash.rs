// src/providers/unsplash.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::{ImageProvider, ImageSearch};

pub const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

#[derive(Debug, Deserialize)]
struct SearchResp {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: Option<Urls>,
}

#[derive(Debug, Deserialize)]
struct Urls {
    regular: Option<String>,
}

pub struct UnsplashProvider {
    http: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl UnsplashProvider {
    pub fn new(http: reqwest::Client, access_key: impl Into<String>) -> Self {
        Self {
            http,
            access_key: access_key.into(),
            base_url: UNSPLASH_SEARCH_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    async fn search(&self, req: &ImageSearch) -> Result<Vec<String>> {
        if self.access_key.is_empty() {
            bail!("UNSPLASH_ACCESS_KEY not configured");
        }

        let mut params: Vec<(&str, String)> = vec![
            ("query", req.query.clone()),
            ("per_page", req.per_page.to_string()),
            ("client_id", self.access_key.clone()),
        ];
        if req.landscape {
            params.push(("orientation", "landscape".to_string()));
        }
        if let Some(page) = req.page {
            params.push(("page", page.to_string()));
        }

        let body: SearchResp = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .context("unsplash http get()")?
            .error_for_status()
            .context("unsplash status")?
            .json()
            .await
            .context("unsplash json")?;

        Ok(body
            .results
            .into_iter()
            .filter_map(|p| p.urls.and_then(|u| u.regular))
            .collect())
    }

    fn name(&self) -> &'static str {
        "unsplash"
    }
}
