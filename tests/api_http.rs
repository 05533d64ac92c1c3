// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /health
// - GET  /api/trips/{category}
// - GET  /api/trips/image         (stored / fallback search / storage failure)
// - GET  /api/tripai/details      (degraded header)
// - GET  /api/tripdetails/details (400 / 403 / 200)
// - POST /api/auth/verify
// - GET  /api/assets/{*path}      (signed local files)

mod common;

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt as _;

use common::*;
use travel_guide::api::HEADER_GUIDE_DEGRADED;
use travel_guide::assets::{FsObjectStore, UrlSigner, ASSET_FALLBACK_URL};
use travel_guide::auth::SessionSigner;
use travel_guide::{router, AppState, Collaborators};

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let resp = get(router_with(collaborators()), "/health").await;
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

// ---------------- trips ----------------

#[tokio::test]
async fn trips_listing_returns_count_and_records() {
    let resp = get(router_with(collaborators()), "/api/trips/popular").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["count"], 1);
    assert_eq!(v["trips"][0]["id"], "popular-1");
    assert_eq!(v["trips"][0]["title"], "A popular trip");
}

#[tokio::test]
async fn unknown_trip_category_is_rejected() {
    for uri in ["/api/trips/invalid", "/api/trips/Recent"] {
        let resp = get(router_with(collaborators()), uri).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");

        let v = body_json(resp).await;
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "Invalid category");
        assert!(v.get("trips").is_none());
    }
}

#[tokio::test]
async fn trip_store_failure_is_500() {
    let c = Collaborators {
        trip_store: Arc::new(StubTrips { fail: true }),
        ..collaborators()
    };
    let resp = get(router_with(c), "/api/trips/recent").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = body_json(resp).await;
    assert_eq!(v["success"], false);
    assert!(v["error"].as_str().unwrap().contains("document store offline"));
}

// ---------------- trip images ----------------

#[tokio::test]
async fn trip_image_requires_a_path() {
    for uri in ["/api/trips/image", "/api/trips/image?path="] {
        let resp = get(router_with(collaborators()), uri).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let v = body_json(resp).await;
        assert_eq!(v["error"], "Missing file path");
    }

    let resp = get(router_with(collaborators()), "/api/trips/image?path=../secret.jpg").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stored_image_gets_a_signed_url() {
    let store = StubObjectStore::with(&["trips/popular/Goa.jpg"]);
    let c = Collaborators {
        object_store: store.clone(),
        ..collaborators()
    };
    let resp = get(router_with(c), "/api/trips/image?path=trips/popular/Goa.jpg").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["source"], "stored");
    assert_eq!(v["url"], "https://storage.test/trips/popular/Goa.jpg?ttl=600");
    assert_eq!(store.signed.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_object_falls_back_to_an_image_search() {
    let images = StubImages::returning("unsplash", &["https://unsplash.test/manali.jpg"]);
    let c = Collaborators {
        primary_images: images.clone(),
        ..collaborators()
    };
    let resp = get(router_with(c), "/api/trips/image?path=trips/recent/Manali.jpg").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["source"], "fallback-search");
    assert_eq!(v["url"], "https://unsplash.test/manali.jpg");
    assert_eq!(images.searches.lock()[0].query, "Manali city travel");
}

#[tokio::test]
async fn missing_object_without_search_hits_uses_the_static_image() {
    let c = Collaborators {
        primary_images: StubImages::empty("unsplash"),
        ..collaborators()
    };
    let v = body_json(get(router_with(c), "/api/trips/image?path=x/Nowhere.png").await).await;
    assert_eq!(v["source"], "static-placeholder");
    assert_eq!(v["url"], ASSET_FALLBACK_URL);
}

#[tokio::test]
async fn storage_failure_is_500_with_a_fallback_url() {
    let c = Collaborators {
        object_store: StubObjectStore::failing(),
        ..collaborators()
    };
    let resp = get(router_with(c), "/api/trips/image?path=trips/popular/Goa.jpg").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let v = body_json(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["fallback"], ASSET_FALLBACK_URL);
    assert!(v["error"].as_str().unwrap().contains("bucket unreachable"));
}

// ---------------- guides ----------------

#[tokio::test]
async fn tripai_details_returns_an_enriched_guide() {
    let completion = StubCompletion::replying(guide_json());
    let c = Collaborators {
        completion: completion.clone(),
        ..collaborators()
    };
    let resp = get(router_with(c), "/api/tripai/details").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[HEADER_GUIDE_DEGRADED], "0");

    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["title"], "Jaipur, the Pink City");
    assert_eq!(v["mainPhoto"], "https://unsplash.test/1.jpg");
    let places = v["places"].as_array().expect("places");
    assert_eq!(places.len(), 3);
    for p in places {
        assert!(p["lat"].is_f64() && p["lng"].is_f64());
        assert!(p["photo"].as_str().is_some_and(|s| !s.is_empty()));
        let r = p["rating"].as_f64().unwrap();
        assert!((4.1..=5.0).contains(&r));
    }

    // default city, qualified with the region
    assert!(completion.prompts.lock()[0].contains("\"Jaipur, India\""));
}

#[tokio::test]
async fn tripai_details_marks_degraded_guides() {
    let c = Collaborators {
        completion: StubCompletion::replying("I can't produce JSON today"),
        ..collaborators()
    };
    let resp = get(router_with(c), "/api/tripai/details?city=Manali").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[HEADER_GUIDE_DEGRADED], "1");

    let v = body_json(resp).await;
    assert_eq!(v["title"], "Manali, India Travel Guide");
    assert_eq!(v["tags"], json!(["Travel", "Culture"]));
    assert_eq!(v["places"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tripai_details_fails_on_empty_answer() {
    let c = Collaborators {
        completion: StubCompletion::replying(""),
        ..collaborators()
    };
    let resp = get(router_with(c), "/api/tripai/details?city=Goa").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = body_json(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["error"], "AI returned empty text");
}

#[tokio::test]
async fn popular_details_status_codes() {
    let resp = get(router_with(collaborators()), "/api/tripdetails/details?city=Goa").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["title"], "Goa Guide");
    assert_eq!(v["center"], json!([74.0, 15.3]));
    assert!(!v["places"].as_array().unwrap().is_empty());

    let resp = get(router_with(collaborators()), "/api/tripdetails/details?city=Atlantis").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"], "Not a popular city");

    let resp = get(router_with(collaborators()), "/api/tripdetails/details").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Missing ?city");
}

// ---------------- auth ----------------

#[tokio::test]
async fn verified_identity_gets_a_session_token() {
    let resp = post_json(
        router_with(collaborators()),
        "/api/auth/verify",
        json!({ "idToken": "good-id-token" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["user"]["user_id"], "uid-42");

    let token = v["token"].as_str().expect("token");
    let claims = SessionSigner::new("test-session-secret")
        .decode(token)
        .expect("session token verifies");
    assert_eq!(claims["sub"], "uid-42");
    let ttl = claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap();
    assert_eq!(ttl, 7 * 24 * 60 * 60);
}

#[tokio::test]
async fn rejected_identity_is_401() {
    let bad = [
        json!({ "idToken": "forged" }),
        json!({}),
        json!({ "idToken": 42 }),
    ];
    for payload in bad {
        let resp = post_json(router_with(collaborators()), "/api/auth/verify", payload.clone()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{payload}");
        let v = body_json(resp).await;
        assert_eq!(v["success"], false);
        assert!(v.get("token").is_none());
    }
}

// ---------------- signed assets ----------------

fn fs_router(dir: &std::path::Path) -> axum::Router {
    let files = Arc::new(FsObjectStore::new(
        dir,
        "/api/assets",
        UrlSigner::new("asset-secret"),
    ));
    let c = Collaborators {
        object_store: files.clone(),
        ..collaborators()
    };
    router(AppState::new(settings(), c).with_asset_files(files))
}

#[tokio::test]
async fn signed_asset_urls_serve_the_stored_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("trips/popular")).unwrap();
    std::fs::write(dir.path().join("trips/popular/Goa.jpg"), b"fake-jpeg").unwrap();

    let resp = get(fs_router(dir.path()), "/api/trips/image?path=trips/popular/Goa.jpg").await;
    let v = body_json(resp).await;
    assert_eq!(v["source"], "stored");
    let url = v["url"].as_str().expect("url").to_string();
    assert!(url.starts_with("/api/assets/trips/popular/Goa.jpg?expires="));

    let resp = get(fs_router(dir.path()), &url).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"fake-jpeg");

    // flip the last signature character
    let mut tampered = url.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });
    let resp = get(fs_router(dir.path()), &tampered).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = get(fs_router(dir.path()), "/api/assets/trips/popular/Goa.jpg").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn asset_route_is_disabled_without_a_local_store() {
    let app = router_with(collaborators());
    let req = Request::builder()
        .uri("/api/assets/trips/popular/Goa.jpg?expires=1&sig=00")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
