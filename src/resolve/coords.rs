// src/resolve/coords.rs
use metrics::counter;
use tracing::{debug, warn};

use crate::model::Coordinates;
use crate::providers::{DynGeocoder, GeoFeature, GeocodeQuery};

/// Geographic center of India; answer of last resort for place lookups.
pub const DEFAULT_CENTER: Coordinates = Coordinates::new(22.3511148, 78.6677428);

pub struct CoordinateResolver {
    geocoder: DynGeocoder,
    fallback: Coordinates,
}

impl CoordinateResolver {
    pub fn new(geocoder: DynGeocoder) -> Self {
        Self {
            geocoder,
            fallback: DEFAULT_CENTER,
        }
    }

    pub fn with_fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn geocoder(&self) -> &DynGeocoder {
        &self.geocoder
    }

    /// Coordinates of `"{place}, {city}"`, or the fallback center.
    pub async fn resolve(&self, place: &str, city: &str) -> Coordinates {
        let q = GeocodeQuery::new(format!("{place}, {city}")).limit(1);
        self.resolve_or(&q, self.fallback).await
    }

    /// First finite hit for `q`, or `fallback`.
    pub async fn resolve_or(&self, q: &GeocodeQuery, fallback: Coordinates) -> Coordinates {
        match self.first_feature(q).await {
            Some(f) => f.center,
            None => {
                counter!("geocode_fallback_total").increment(1);
                debug!(query = %q.query, lat = fallback.lat, lng = fallback.lng, "using fallback center");
                fallback
            }
        }
    }

    async fn first_feature(&self, q: &GeocodeQuery) -> Option<GeoFeature> {
        match self.geocoder.forward(q).await {
            Ok(features) => features.into_iter().find(|f| f.center.is_finite()),
            Err(e) => {
                warn!(error = ?e, provider = self.geocoder.name(), query = %q.query, "geocoder failed");
                None
            }
        }
    }
}
