// src/api.rs
use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt as _;
use tower_http::{cors::CorsLayer, services::ServeFile, trace::TraceLayer};
use tracing::{error, warn};

use crate::assets::{validate_storage_path, AssetError};
use crate::auth::Claims;
use crate::error::ApiError;
use crate::guide::DetailsError;
use crate::model::{AssetSource, CityDetails, TripGuide};
use crate::state::AppState;
use crate::trips::{TripCategory, TripRecord};

pub const HEADER_GUIDE_DEGRADED: &str = "x-guide-degraded";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/verify", post(auth_verify))
        .route("/api/trips/image", get(trip_image))
        .route("/api/trips/{category}", get(list_trips))
        .route("/api/tripai/details", get(tripai_details))
        .route("/api/tripdetails/details", get(popular_details))
        .route("/api/assets/{*path}", get(serve_asset))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---------------- auth ----------------

#[derive(Deserialize)]
struct VerifyReq {
    #[serde(rename = "idToken", default)]
    id_token: String,
}

#[derive(Serialize)]
struct VerifyResp {
    success: bool,
    token: String,
    user: Claims,
}

async fn auth_verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyReq>, JsonRejection>,
) -> Result<Json<VerifyResp>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::Unauthorized(e.body_text()))?;
    let session = state.auth.exchange(&body.id_token).await.map_err(|e| {
        warn!(error = ?e, "sign-in rejected");
        ApiError::Unauthorized(format!("{e:#}"))
    })?;
    Ok(Json(VerifyResp {
        success: true,
        token: session.token,
        user: session.user,
    }))
}

// ---------------- trips ----------------

#[derive(Deserialize)]
struct ImageQuery {
    path: Option<String>,
}

#[derive(Serialize)]
struct ImageResp {
    success: bool,
    url: String,
    source: AssetSource,
}

async fn trip_image(
    State(state): State<AppState>,
    Query(q): Query<ImageQuery>,
) -> Result<Json<ImageResp>, ApiError> {
    let path = q.path.unwrap_or_default();
    match state.assets.resolve(&path).await {
        Ok(asset) => Ok(Json(ImageResp {
            success: true,
            url: asset.resolved_url,
            source: asset.source,
        })),
        Err(e @ (AssetError::MissingPath | AssetError::InvalidPath)) => {
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(e @ AssetError::Storage(_)) => {
            error!(error = %e, %path, "asset resolution failed");
            Err(ApiError::internal_with_fallback(
                e.to_string(),
                state.assets.fallback_url(),
            ))
        }
    }
}

#[derive(Serialize)]
struct TripsResp {
    success: bool,
    count: usize,
    trips: Vec<TripRecord>,
}

async fn list_trips(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<TripsResp>, ApiError> {
    let category: TripCategory = category
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid category".into()))?;

    let trips = state.trips.list(category).await.map_err(|e| {
        error!(error = ?e, %category, "listing trips failed");
        ApiError::internal(format!("{e:#}"))
    })?;

    Ok(Json(TripsResp {
        success: true,
        count: trips.len(),
        trips,
    }))
}

// ---------------- guides ----------------

#[derive(Deserialize)]
struct CityQuery {
    city: Option<String>,
}

#[derive(Serialize)]
struct GuideResp {
    success: bool,
    #[serde(flatten)]
    guide: TripGuide,
}

async fn tripai_details(
    State(state): State<AppState>,
    Query(q): Query<CityQuery>,
) -> Result<Response, ApiError> {
    let city = q
        .city
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.default_city.clone());

    let report = state.guides.build_guide(&city).await.map_err(|e| {
        error!(error = %e, %city, "trip guide failed");
        ApiError::internal(e.to_string())
    })?;

    let mut resp = Json(GuideResp {
        success: true,
        guide: report.guide,
    })
    .into_response();
    resp.headers_mut().insert(
        HEADER_GUIDE_DEGRADED,
        HeaderValue::from_static(if report.degraded { "1" } else { "0" }),
    );
    Ok(resp)
}

#[derive(Serialize)]
struct DetailsResp {
    success: bool,
    #[serde(flatten)]
    details: CityDetails,
}

async fn popular_details(
    State(state): State<AppState>,
    Query(q): Query<CityQuery>,
) -> Result<Json<DetailsResp>, ApiError> {
    match state.popular.details(q.city.as_deref()).await {
        Ok(details) => Ok(Json(DetailsResp {
            success: true,
            details,
        })),
        Err(e @ DetailsError::MissingCity) => Err(ApiError::BadRequest(e.to_string())),
        Err(e @ DetailsError::NotPopular(_)) => Err(ApiError::Forbidden(e.to_string())),
        Err(e @ DetailsError::Upstream(_)) => {
            error!(error = ?e, "popular city details failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}

// ---------------- signed assets ----------------

#[derive(Deserialize)]
struct SignedQuery {
    #[serde(default)]
    expires: i64,
    #[serde(default)]
    sig: String,
}

async fn serve_asset(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(q): Query<SignedQuery>,
    req: Request,
) -> Result<Response, ApiError> {
    let files = state
        .asset_files
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Asset serving disabled".into()))?;
    let path = validate_storage_path(&path).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    let file = files
        .authorize(path, q.expires, &q.sig, now)
        .ok_or_else(|| ApiError::Forbidden("Invalid or expired signature".into()))?;

    match ServeFile::new(file).oneshot(req).await {
        Ok(res) => Ok(res.into_response()),
        Err(never) => match never {},
    }
}
