// src/guide/popular.rs
//! Details for a fixed set of popular cities, built from the geocoder's nearby search
//! instead of the completion model.

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{CityDetails, Coordinates, NearbyPlace};
use crate::providers::{GeoFeature, GeocodeQuery, ImageSearch};
use crate::random::{rating_between, DynRandom};
use crate::resolve::{CoordinateResolver, ImageResolver, Pick};

/// New Delhi; used when the city itself cannot be geocoded.
pub const DETAILS_FALLBACK_CENTER: Coordinates = Coordinates::new(28.6, 77.2);
pub const ATTRACTION_TYPES: [&str; 4] = ["tourist_attraction", "cafe", "museum", "park"];
pub const NEARBY_LIMIT: u32 = 10;
pub const DETAILS_RATING_MIN: f64 = 3.5;
pub const DETAILS_RATING_MAX: f64 = 5.0;

#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("Missing ?city")]
    MissingCity,

    #[error("Not a popular city")]
    NotPopular(String),

    #[error("Failed to load trip details")]
    Upstream(#[source] anyhow::Error),
}

pub struct PopularCityGuide {
    coords: Arc<CoordinateResolver>,
    images: Arc<ImageResolver>,
    random: DynRandom,
    cities: Vec<String>,
}

impl PopularCityGuide {
    pub fn new(
        coords: Arc<CoordinateResolver>,
        images: Arc<ImageResolver>,
        random: DynRandom,
        cities: Vec<String>,
    ) -> Self {
        Self {
            coords,
            images,
            random,
            cities,
        }
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Allow-list spelling of `city`, matched case-insensitively.
    pub fn canonical_city(&self, city: &str) -> Option<&str> {
        let city = city.trim();
        self.cities
            .iter()
            .find(|c| c.eq_ignore_ascii_case(city))
            .map(String::as_str)
    }

    pub async fn details(&self, city: Option<&str>) -> Result<CityDetails, DetailsError> {
        let requested = city.map(str::trim).filter(|c| !c.is_empty());
        let requested = requested.ok_or(DetailsError::MissingCity)?;
        let city = self
            .canonical_city(requested)
            .ok_or_else(|| DetailsError::NotPopular(requested.to_string()))?;

        let center = self
            .coords
            .resolve_or(&GeocodeQuery::new(city), DETAILS_FALLBACK_CENTER)
            .await;

        let nearby = GeocodeQuery::new(ATTRACTION_TYPES.join(","))
            .near(center)
            .limit(NEARBY_LIMIT);
        let geocoder = self.coords.geocoder();
        let features = geocoder.forward(&nearby).await.map_err(|e| {
            warn!(error = ?e, provider = geocoder.name(), %city, "nearby search failed");
            DetailsError::Upstream(e)
        })?;

        let places = join_all(features.into_iter().map(|f| self.nearby_place(f, city))).await;
        info!(%city, places = places.len(), "popular city details built");

        Ok(CityDetails {
            title: format!("{city} Guide"),
            intro: format!(
                "Discover the best attractions, cafes, and landmarks around {city}."
            ),
            center: center.to_lng_lat(),
            places,
        })
    }

    async fn nearby_place(&self, f: GeoFeature, city: &str) -> NearbyPlace {
        let search = ImageSearch::new(format!("{} {city}", f.text), 1);
        let photo = self
            .images
            .lookup(self.images.primary().as_ref(), &search, Pick::First)
            .await
            .url();

        NearbyPlace {
            name: f.text,
            address: f.place_name,
            lat: f.center.lat,
            lng: f.center.lng,
            photo,
            rating: rating_between(self.random.as_ref(), DETAILS_RATING_MIN, DETAILS_RATING_MAX),
        }
    }
}
