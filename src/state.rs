// src/state.rs
//! Shared, immutable application state and the wiring of external collaborators.

use std::sync::Arc;

use crate::assets::{AssetGateway, DynObjectStore, FsObjectStore, UrlSigner};
use crate::auth::{AuthService, DynIdentityVerifier, FirebaseVerifier, SessionSigner};
use crate::config::{cities, AppConfig, DEFAULT_GUIDE_CITY, DEFAULT_GUIDE_REGION};
use crate::guide::{GuideSynthesizer, PopularCityGuide, TripAggregator};
use crate::providers::{
    self, groq::GroqClient, mapbox::MapboxGeocoder, pexels::PexelsProvider,
    unsplash::UnsplashProvider, DynCompletionClient, DynGeocoder, DynImageProvider,
};
use crate::random::{DynRandom, ThreadRandom};
use crate::resolve::{CoordinateResolver, ImageResolver};
use crate::trips::{DynTripStore, JsonDirTripStore};

/// Everything the service talks to. Production builds these from [`AppConfig`];
/// tests substitute stubs.
#[derive(Clone)]
pub struct Collaborators {
    pub completion: DynCompletionClient,
    pub geocoder: DynGeocoder,
    pub primary_images: DynImageProvider,
    pub secondary_images: DynImageProvider,
    pub object_store: DynObjectStore,
    pub trip_store: DynTripStore,
    pub identity: DynIdentityVerifier,
    pub random: DynRandom,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub region: String,
    pub default_city: String,
    pub popular_cities: Vec<String>,
    pub jwt_secret: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_GUIDE_REGION.to_string(),
            default_city: DEFAULT_GUIDE_CITY.to_string(),
            popular_cities: cities::default_cities(),
            jwt_secret: String::new(),
        }
    }
}

impl From<&AppConfig> for Settings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            region: cfg.guide_region.clone(),
            default_city: cfg.guide_default_city.clone(),
            popular_cities: cfg.popular_cities.clone(),
            jwt_secret: cfg.jwt_secret.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub guides: Arc<TripAggregator>,
    pub popular: Arc<PopularCityGuide>,
    pub assets: Arc<AssetGateway>,
    /// Set when the object store is local and `/api/assets/...` should serve it.
    pub asset_files: Option<Arc<FsObjectStore>>,
    pub trips: DynTripStore,
    pub auth: Arc<AuthService>,
    pub default_city: String,
}

impl AppState {
    pub fn new(settings: Settings, c: Collaborators) -> Self {
        let coords = Arc::new(CoordinateResolver::new(c.geocoder.clone()));
        let images = Arc::new(ImageResolver::new(
            c.primary_images.clone(),
            c.secondary_images.clone(),
            c.random.clone(),
        ));

        let guides = TripAggregator::new(
            GuideSynthesizer::new(c.completion.clone()),
            coords.clone(),
            images.clone(),
            c.random.clone(),
        )
        .with_region(settings.region);

        let popular = PopularCityGuide::new(
            coords,
            images.clone(),
            c.random.clone(),
            settings.popular_cities,
        );

        Self {
            guides: Arc::new(guides),
            popular: Arc::new(popular),
            assets: Arc::new(AssetGateway::new(c.object_store.clone(), images)),
            asset_files: None,
            trips: c.trip_store,
            auth: Arc::new(AuthService::new(
                c.identity,
                SessionSigner::new(settings.jwt_secret),
            )),
            default_city: settings.default_city,
        }
    }

    pub fn with_asset_files(mut self, files: Arc<FsObjectStore>) -> Self {
        self.asset_files = Some(files);
        self
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let http = providers::http_client(cfg.http_timeout)?;

        let files = Arc::new(FsObjectStore::new(
            &cfg.storage_bucket,
            &cfg.asset_public_base,
            UrlSigner::new(&cfg.asset_signing_secret),
        ));

        let collaborators = Collaborators {
            completion: Arc::new(
                GroqClient::new(http.clone(), &cfg.groq_api_key).with_model(&cfg.groq_model),
            ),
            geocoder: Arc::new(MapboxGeocoder::new(http.clone(), &cfg.mapbox_token)),
            primary_images: Arc::new(UnsplashProvider::new(http.clone(), &cfg.unsplash_key)),
            secondary_images: Arc::new(PexelsProvider::new(http.clone(), &cfg.pexels_key)),
            object_store: files.clone(),
            trip_store: Arc::new(JsonDirTripStore::new(&cfg.trips_dir)),
            identity: Arc::new(FirebaseVerifier::new(http, &cfg.firebase_project_id)),
            random: Arc::new(ThreadRandom),
        };

        Ok(Self::new(Settings::from(cfg), collaborators).with_asset_files(files))
    }
}
