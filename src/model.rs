// src/model.rs
//! Response records shared by the guide, details and asset paths.
//! Everything here is built per request and dropped once the response is sent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Geocoders (Mapbox, GeoJSON) report positions as `[lng, lat]`.
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lng: pair[0],
        }
    }

    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub date: String,
    pub views: u64,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            name: "Traveler".to_string(),
            date: String::new(),
            views: 0,
        }
    }
}

/// A place inside a [`TripGuide`]. `rating` is synthetic, not sourced from any review data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub category: String,
    pub desc: String,
    pub lat: f64,
    pub lng: f64,
    pub photo: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripGuide {
    pub title: String,
    pub intro: String,
    pub tags: Vec<String>,
    pub tips: String,
    pub author: Author,
    pub main_photo: String,
    pub places: Vec<Place>,
}

/// Entry of the popular-city details listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub photo: Option<String>,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDetails {
    pub title: String,
    pub intro: String,
    /// `[lng, lat]`, as the frontend map widget expects.
    pub center: [f64; 2],
    pub places: Vec<NearbyPlace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetSource {
    Stored,
    FallbackSearch,
    StaticPlaceholder,
}

impl AssetSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetSource::Stored => "stored",
            AssetSource::FallbackSearch => "fallback-search",
            AssetSource::StaticPlaceholder => "static-placeholder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReference {
    pub storage_path: String,
    pub resolved_url: String,
    pub source: AssetSource,
}
