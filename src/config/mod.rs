// src/config/mod.rs
//! Environment-driven configuration. Every key is optional: a missing provider key
//! degrades that provider to its fallback path instead of failing startup.

pub mod cities;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_GROQ_MODEL: &str = "GROQ_MODEL";
pub const ENV_MAPBOX_TOKEN: &str = "MAPBOX_TOKEN";
pub const ENV_UNSPLASH_KEY: &str = "UNSPLASH_ACCESS_KEY";
pub const ENV_PEXELS_KEY: &str = "PEXELS_API_KEY";
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
pub const ENV_FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const ENV_STORAGE_BUCKET: &str = "STORAGE_BUCKET";
pub const ENV_ASSET_PUBLIC_BASE: &str = "ASSET_PUBLIC_BASE";
pub const ENV_ASSET_SIGNING_SECRET: &str = "ASSET_SIGNING_SECRET";
pub const ENV_TRIPS_DIR: &str = "TRIPS_DIR";
pub const ENV_GUIDE_REGION: &str = "GUIDE_REGION";
pub const ENV_GUIDE_DEFAULT_CITY: &str = "GUIDE_DEFAULT_CITY";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_STORAGE_BUCKET: &str = "storage";
pub const DEFAULT_ASSET_PUBLIC_BASE: &str = "/api/assets";
pub const DEFAULT_TRIPS_DIR: &str = "data/trips";
pub const DEFAULT_GUIDE_REGION: &str = "India";
pub const DEFAULT_GUIDE_CITY: &str = "Jaipur";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub groq_api_key: String,
    pub groq_model: String,
    pub mapbox_token: String,
    pub unsplash_key: String,
    pub pexels_key: String,
    pub jwt_secret: String,
    pub firebase_project_id: String,
    /// Root directory of the filesystem object store.
    pub storage_bucket: PathBuf,
    pub asset_public_base: String,
    pub asset_signing_secret: String,
    pub trips_dir: PathBuf,
    pub guide_region: String,
    pub guide_default_city: String,
    pub http_timeout: Duration,
    pub debug_routes: bool,
    pub popular_cities: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = secret(ENV_JWT_SECRET);
        // Signed asset URLs reuse the session secret unless a dedicated one is set.
        let asset_signing_secret = match secret(ENV_ASSET_SIGNING_SECRET) {
            s if s.is_empty() => jwt_secret.clone(),
            s => s,
        };

        let cfg = Self {
            groq_api_key: secret(ENV_GROQ_API_KEY),
            groq_model: string_or(ENV_GROQ_MODEL, DEFAULT_GROQ_MODEL),
            mapbox_token: secret(ENV_MAPBOX_TOKEN),
            unsplash_key: secret(ENV_UNSPLASH_KEY),
            pexels_key: secret(ENV_PEXELS_KEY),
            jwt_secret,
            firebase_project_id: secret(ENV_FIREBASE_PROJECT_ID),
            storage_bucket: PathBuf::from(string_or(ENV_STORAGE_BUCKET, DEFAULT_STORAGE_BUCKET)),
            asset_public_base: string_or(ENV_ASSET_PUBLIC_BASE, DEFAULT_ASSET_PUBLIC_BASE),
            asset_signing_secret,
            trips_dir: PathBuf::from(string_or(ENV_TRIPS_DIR, DEFAULT_TRIPS_DIR)),
            guide_region: string_or(ENV_GUIDE_REGION, DEFAULT_GUIDE_REGION),
            guide_default_city: string_or(ENV_GUIDE_DEFAULT_CITY, DEFAULT_GUIDE_CITY),
            http_timeout: Duration::from_secs(parse_secs(
                env::var(ENV_HTTP_TIMEOUT_SECS).ok(),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            debug_routes: env::var(ENV_DEBUG_ROUTES).ok().as_deref() == Some("1"),
            popular_cities: cities::load_popular_cities_default()?,
        };

        // Only presence is logged, never the values.
        info!(
            groq = !cfg.groq_api_key.is_empty(),
            mapbox = !cfg.mapbox_token.is_empty(),
            unsplash = !cfg.unsplash_key.is_empty(),
            pexels = !cfg.pexels_key.is_empty(),
            jwt = !cfg.jwt_secret.is_empty(),
            firebase_project = %cfg.firebase_project_id,
            popular_cities = cfg.popular_cities.len(),
            "config loaded"
        );
        Ok(cfg)
    }
}

fn secret(key: &str) -> String {
    env::var(key).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn string_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

// zero or garbage falls back to the default
fn parse_secs(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
