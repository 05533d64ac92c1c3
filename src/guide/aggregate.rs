// src/guide/aggregate.rs
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use metrics::histogram;
use tracing::info;

use super::synth::{GuideSynthesizer, PlaceDraft, SynthesisError};
use crate::model::{Place, TripGuide};
use crate::random::{rating_between, DynRandom};
use crate::resolve::{CoordinateResolver, ImageResolver};

pub const GUIDE_RATING_MIN: f64 = 4.1;
pub const GUIDE_RATING_MAX: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GuideReport {
    pub guide: TripGuide,
    /// The model's answer was unusable and the minimal fallback guide was enriched instead.
    pub degraded: bool,
}

pub struct TripAggregator {
    synthesizer: GuideSynthesizer,
    coords: Arc<CoordinateResolver>,
    images: Arc<ImageResolver>,
    random: DynRandom,
    region: String,
}

impl TripAggregator {
    pub fn new(
        synthesizer: GuideSynthesizer,
        coords: Arc<CoordinateResolver>,
        images: Arc<ImageResolver>,
        random: DynRandom,
    ) -> Self {
        Self {
            synthesizer,
            coords,
            images,
            random,
            region: String::new(),
        }
    }

    /// Region appended to every city name ("Jaipur" -> "Jaipur, India").
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn qualify(&self, city: &str) -> String {
        let city = city.trim();
        if self.region.is_empty() {
            city.to_string()
        } else {
            format!("{city}, {}", self.region)
        }
    }

    /// Synthesize a guide for `city` and enrich every place with coordinates, a photo and
    /// a rating. Fails only when synthesis fails, before any enrichment has started.
    pub async fn build_guide(&self, city: &str) -> Result<GuideReport, SynthesisError> {
        let t0 = Instant::now();
        let city = self.qualify(city);

        let synthesis = self.synthesizer.synthesize(&city).await?;
        let degraded = synthesis.is_fallback();
        let draft = synthesis.into_draft();

        // Places are independent; each future writes only its own record.
        let places = join_all(draft.places.into_iter().map(|p| self.enrich(p, &city))).await;

        let hero = self.images.resolve(&city).await;

        let guide = TripGuide {
            title: draft.title,
            intro: draft.intro,
            tags: draft.tags,
            tips: draft.tips,
            author: draft.author.into(),
            main_photo: hero.url,
            places,
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("guide_build_ms").record(ms);
        info!(%city, places = guide.places.len(), degraded, ms, "trip guide built");

        Ok(GuideReport { guide, degraded })
    }

    async fn enrich(&self, draft: PlaceDraft, city: &str) -> Place {
        let (lat, lng) = if draft.needs_coordinates() {
            let c = self.coords.resolve(&draft.name, city).await;
            (c.lat, c.lng)
        } else {
            (draft.lat.unwrap_or_default(), draft.lng.unwrap_or_default())
        };

        let photo = self.images.resolve(&draft.name).await;

        Place {
            name: draft.name,
            category: draft.category,
            desc: draft.desc,
            lat,
            lng,
            photo: photo.url,
            rating: rating_between(self.random.as_ref(), GUIDE_RATING_MIN, GUIDE_RATING_MAX),
        }
    }
}
