// tests/common/mod.rs
//
// Stub collaborators shared by the integration tests. Every stub is deterministic and
// never touches the network.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, Response};
use parking_lot::Mutex;
use serde_json::{json, Value};

use travel_guide::assets::ObjectStore;
use travel_guide::auth::{Claims, IdentityVerifier};
use travel_guide::model::Coordinates;
use travel_guide::providers::{
    CompletionClient, GeoFeature, GeocodeQuery, Geocoder, ImageProvider, ImageSearch,
};
use travel_guide::random::FixedRandom;
use travel_guide::trips::{TripCategory, TripRecord, TripStore};
use travel_guide::{AppState, Collaborators, Settings};

pub const BODY_LIMIT: usize = 1024 * 1024;

// ---------------- completion ----------------

pub struct StubCompletion {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(msg: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(msg.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.reply.clone().map_err(|e| anyhow!(e))
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

pub fn guide_json() -> String {
    json!({
        "title": "Jaipur, the Pink City",
        "intro": "Forts and bazaars.",
        "tags": ["Heritage", "Food"],
        "tips": "Start early.",
        "author": {"name": "Asha", "date": "Jan 2025", "views": 310},
        "places": [
            {"name": "Amber Fort", "category": "Fort", "desc": "Hilltop fort", "lat": 26.9855, "lng": 75.8513},
            {"name": "Hawa Mahal", "category": "Palace", "desc": "Palace of winds"},
            {"name": "Jal Mahal", "category": "Palace", "desc": "Water palace", "lat": 0, "lng": 0}
        ]
    })
    .to_string()
}

// ---------------- geocoder ----------------

#[derive(Default)]
pub struct StubGeocoder {
    pub by_query: HashMap<String, Vec<GeoFeature>>,
    pub fail: bool,
    pub calls: Mutex<Vec<GeocodeQuery>>,
}

impl StubGeocoder {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn with(entries: Vec<(&str, Vec<GeoFeature>)>) -> Arc<Self> {
        Arc::new(Self {
            by_query: entries
                .into_iter()
                .map(|(q, v)| (q.to_string(), v))
                .collect(),
            ..Default::default()
        })
    }
}

pub fn feature(text: &str, lat: f64, lng: f64) -> GeoFeature {
    GeoFeature {
        text: text.to_string(),
        place_name: format!("{text}, India"),
        center: Coordinates::new(lat, lng),
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn forward(&self, q: &GeocodeQuery) -> Result<Vec<GeoFeature>> {
        self.calls.lock().push(q.clone());
        if self.fail {
            bail!("geocoder down");
        }
        Ok(self.by_query.get(&q.query).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "stub-geo"
    }
}

// ---------------- images ----------------

pub struct StubImages {
    name: &'static str,
    urls: Vec<String>,
    fail: bool,
    pub searches: Mutex<Vec<ImageSearch>>,
}

impl StubImages {
    pub fn returning(name: &'static str, urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            urls: urls.iter().map(|u| u.to_string()).collect(),
            fail: false,
            searches: Mutex::new(Vec::new()),
        })
    }

    pub fn empty(name: &'static str) -> Arc<Self> {
        Self::returning(name, &[])
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            urls: Vec::new(),
            fail: true,
            searches: Mutex::new(Vec::new()),
        })
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().len()
    }
}

#[async_trait]
impl ImageProvider for StubImages {
    async fn search(&self, req: &ImageSearch) -> Result<Vec<String>> {
        self.searches.lock().push(req.clone());
        if self.fail {
            bail!("{} unavailable", self.name);
        }
        Ok(self.urls.clone())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

// ---------------- object store ----------------

pub struct StubObjectStore {
    existing: Vec<String>,
    fail: bool,
    pub signed: AtomicUsize,
}

impl StubObjectStore {
    pub fn with(existing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            existing: existing.iter().map(|s| s.to_string()).collect(),
            fail: false,
            signed: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            existing: Vec::new(),
            fail: true,
            signed: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ObjectStore for StubObjectStore {
    async fn exists(&self, path: &str) -> Result<bool> {
        if self.fail {
            bail!("bucket unreachable");
        }
        Ok(self.existing.iter().any(|p| p == path))
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String> {
        self.signed.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://storage.test/{path}?ttl={}", ttl.as_secs()))
    }

    fn name(&self) -> &'static str {
        "stub-store"
    }
}

// ---------------- trips ----------------

#[derive(Default)]
pub struct StubTrips {
    pub fail: bool,
}

#[async_trait]
impl TripStore for StubTrips {
    async fn list(&self, category: TripCategory) -> Result<Vec<TripRecord>> {
        if self.fail {
            bail!("document store offline");
        }
        let mut fields = serde_json::Map::new();
        fields.insert("title".into(), Value::from(format!("A {category} trip")));
        Ok(vec![TripRecord {
            id: format!("{category}-1"),
            fields,
        }])
    }
}

// ---------------- identity ----------------

/// Accepts exactly one token and returns fixed claims for it.
pub struct StubIdentity {
    pub valid_token: String,
}

#[async_trait]
impl IdentityVerifier for StubIdentity {
    async fn verify(&self, id_token: &str) -> Result<Claims> {
        if id_token != self.valid_token {
            bail!("Firebase ID token has invalid signature");
        }
        let mut c = Claims::new();
        c.insert("sub".into(), Value::from("uid-42"));
        c.insert("user_id".into(), Value::from("uid-42"));
        c.insert("email".into(), Value::from("traveler@example.com"));
        Ok(c)
    }

    fn name(&self) -> &'static str {
        "stub-identity"
    }
}

// ---------------- wiring ----------------

pub fn fixed_random() -> Arc<FixedRandom> {
    Arc::new(FixedRandom {
        index: 0,
        unit: 0.5,
    })
}

/// Happy-path collaborators: every provider answers.
pub fn collaborators() -> Collaborators {
    Collaborators {
        completion: StubCompletion::replying(guide_json()),
        geocoder: StubGeocoder::with(vec![
            ("Hawa Mahal, Jaipur, India", vec![feature("Hawa Mahal", 26.9239, 75.8267)]),
            ("Goa", vec![feature("Goa", 15.3, 74.0)]),
            (
                "tourist_attraction,cafe,museum,park",
                vec![
                    feature("Fort Aguada", 15.49, 73.77),
                    feature("Cafe Mambo", 15.55, 73.75),
                ],
            ),
        ]),
        primary_images: StubImages::returning("unsplash", &["https://unsplash.test/1.jpg"]),
        secondary_images: StubImages::returning("pexels", &["https://pexels.test/1.jpg"]),
        object_store: StubObjectStore::with(&["trips/popular/Goa.jpg"]),
        trip_store: Arc::new(StubTrips::default()),
        identity: Arc::new(StubIdentity {
            valid_token: "good-id-token".into(),
        }),
        random: fixed_random(),
    }
}

pub fn settings() -> Settings {
    Settings {
        jwt_secret: "test-session-secret".into(),
        ..Settings::default()
    }
}

pub fn router_with(c: Collaborators) -> axum::Router {
    travel_guide::router(AppState::new(settings(), c))
}

pub async fn get(app: axum::Router, uri: &str) -> Response<Body> {
    use tower::ServiceExt as _;
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("build GET"),
    )
    .await
    .expect("oneshot GET")
}

pub async fn post_json(app: axum::Router, uri: &str, payload: Value) -> Response<Body> {
    use tower::ServiceExt as _;
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("build POST"),
    )
    .await
    .expect("oneshot POST")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}
