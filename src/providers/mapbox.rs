// src/providers/mapbox.rs
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{GeoFeature, GeocodeQuery, Geocoder};
use crate::model::Coordinates;

pub const MAPBOX_GEOCODE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    text: String,
    #[serde(default)]
    place_name: String,
    center: Option<[f64; 2]>,
}

pub struct MapboxGeocoder {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl MapboxGeocoder {
    pub fn new(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            base_url: MAPBOX_GEOCODE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// `{base}/{percent-encoded query}.json`
    fn endpoint(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("mapbox base url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("mapbox base url cannot carry a path"))?
            .pop_if_empty()
            .push(&format!("{query}.json"));
        Ok(url)
    }
}

fn to_features(fc: FeatureCollection) -> Vec<GeoFeature> {
    fc.features
        .into_iter()
        .filter_map(|f| {
            let center = Coordinates::from_lng_lat(f.center?);
            Some(GeoFeature {
                text: f.text,
                place_name: f.place_name,
                center,
            })
        })
        .collect()
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward(&self, q: &GeocodeQuery) -> Result<Vec<GeoFeature>> {
        if self.token.is_empty() {
            bail!("MAPBOX_TOKEN not configured");
        }

        let mut params: Vec<(&str, String)> = vec![("access_token", self.token.clone())];
        if let Some(limit) = q.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(p) = q.proximity {
            params.push(("proximity", format!("{},{}", p.lng, p.lat)));
        }

        let fc: FeatureCollection = self
            .http
            .get(self.endpoint(&q.query)?)
            .query(&params)
            .send()
            .await
            .context("mapbox http get()")?
            .error_for_status()
            .context("mapbox status")?
            .json()
            .await
            .context("mapbox json")?;

        Ok(to_features(fc))
    }

    fn name(&self) -> &'static str {
        "mapbox"
    }
}
