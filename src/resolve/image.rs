// src/resolve/image.rs
//! Image lookups over the primary (Unsplash) and secondary (Pexels) search providers.
//!
//! Picks are randomized through the injected [`RandomSource`], so repeated identical
//! queries can legitimately return different images. Tests pin the source.

use metrics::counter;
use tracing::warn;

use crate::providers::{DynImageProvider, ImageProvider, ImageSearch};
use crate::random::DynRandom;

pub const NO_IMAGE_PLACEHOLDER: &str = "https://placehold.co/600x400?text=No+Image";

const PRIMARY_PER_PAGE: u32 = 20;
const PRIMARY_PAGES: usize = 5;
const SECONDARY_PER_PAGE: u32 = 15;

/// Outcome of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLookup {
    Found(String),
    /// The provider answered but had nothing usable.
    NotFound,
    /// Transport, status or decode error (already logged).
    Failed,
}

impl ImageLookup {
    pub fn url(self) -> Option<String> {
        match self {
            ImageLookup::Found(u) => Some(u),
            _ => None,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            ImageLookup::Found(_) => "found",
            ImageLookup::NotFound => "not_found",
            ImageLookup::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Random,
    First,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Primary,
    Secondary,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub url: String,
    pub source: ImageSource,
}

pub struct ImageResolver {
    primary: DynImageProvider,
    secondary: DynImageProvider,
    random: DynRandom,
    placeholder: String,
}

impl ImageResolver {
    pub fn new(primary: DynImageProvider, secondary: DynImageProvider, random: DynRandom) -> Self {
        Self {
            primary,
            secondary,
            random,
            placeholder: NO_IMAGE_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_placeholder(mut self, url: impl Into<String>) -> Self {
        self.placeholder = url.into();
        self
    }

    pub fn primary(&self) -> &DynImageProvider {
        &self.primary
    }

    /// One search against `provider`; errors are swallowed into [`ImageLookup::Failed`].
    pub async fn lookup(
        &self,
        provider: &dyn ImageProvider,
        search: &ImageSearch,
        pick: Pick,
    ) -> ImageLookup {
        let result = match provider.search(search).await {
            Ok(urls) if urls.is_empty() => ImageLookup::NotFound,
            Ok(mut urls) => {
                let idx = match pick {
                    Pick::First => 0,
                    Pick::Random => self.random.pick(urls.len()),
                };
                ImageLookup::Found(urls.swap_remove(idx))
            }
            Err(e) => {
                warn!(error = ?e, provider = provider.name(), query = %search.query, "image search failed");
                ImageLookup::Failed
            }
        };
        counter!(
            "image_lookup_total",
            "provider" => provider.name(),
            "outcome" => result.outcome()
        )
        .increment(1);
        result
    }

    /// Primary lookup with a random result page, as used for guide photos.
    pub async fn lookup_primary(&self, query: &str) -> ImageLookup {
        let page = self.random.pick(PRIMARY_PAGES) as u32 + 1;
        let search = ImageSearch::new(query, PRIMARY_PER_PAGE)
            .landscape()
            .page(page);
        self.lookup(self.primary.as_ref(), &search, Pick::Random).await
    }

    pub async fn lookup_secondary(&self, query: &str) -> ImageLookup {
        let search = ImageSearch::new(query, SECONDARY_PER_PAGE);
        self.lookup(self.secondary.as_ref(), &search, Pick::Random)
            .await
    }

    /// Full chain: primary, then secondary, then the placeholder. Never empty.
    pub async fn resolve(&self, query: &str) -> ResolvedImage {
        if let Some(url) = self.lookup_primary(query).await.url() {
            return ResolvedImage {
                url,
                source: ImageSource::Primary,
            };
        }
        if let Some(url) = self.lookup_secondary(query).await.url() {
            return ResolvedImage {
                url,
                source: ImageSource::Secondary,
            };
        }
        ResolvedImage {
            url: self.placeholder.clone(),
            source: ImageSource::Placeholder,
        }
    }
}
