// src/providers/pexels.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use super::{ImageProvider, ImageSearch};

pub const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/v1/search";

#[derive(Debug, Deserialize)]
struct SearchResp {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: Option<Src>,
}

#[derive(Debug, Deserialize)]
struct Src {
    landscape: Option<String>,
}

pub struct PexelsProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PexelsProvider {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: PEXELS_SEARCH_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl ImageProvider for PexelsProvider {
    async fn search(&self, req: &ImageSearch) -> Result<Vec<String>> {
        if self.api_key.is_empty() {
            bail!("PEXELS_API_KEY not configured");
        }

        let mut params: Vec<(&str, String)> = vec![
            ("query", req.query.clone()),
            ("per_page", req.per_page.to_string()),
        ];
        if let Some(page) = req.page {
            params.push(("page", page.to_string()));
        }

        let body: SearchResp = self
            .http
            .get(&self.base_url)
            .header(AUTHORIZATION, &self.api_key)
            .query(&params)
            .send()
            .await
            .context("pexels http get()")?
            .error_for_status()
            .context("pexels status")?
            .json()
            .await
            .context("pexels json")?;

        Ok(body
            .photos
            .into_iter()
            .filter_map(|p| p.src.and_then(|s| s.landscape))
            .collect())
    }

    fn name(&self) -> &'static str {
        "pexels"
    }
}
