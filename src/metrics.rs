use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the process-wide Prometheus recorder once and return its handle.
/// Later calls (e.g. each test building its own app) reuse the first handle.
pub fn handle() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = match PrometheusBuilder::new().install_recorder() {
                Ok(h) => h,
                Err(e) => {
                    // Another recorder owns the process; expose an empty detached one.
                    warn!(error = %e, "prometheus recorder already installed");
                    PrometheusBuilder::new().build_recorder().handle()
                }
            };
            describe();
            handle
        })
        .clone()
}

fn describe() {
    describe_counter!(
        "image_lookup_total",
        "Image provider lookups by provider and outcome (found/not_found/failed)."
    );
    describe_counter!(
        "geocode_fallback_total",
        "Coordinate lookups answered with the fallback center."
    );
    describe_counter!(
        "guide_synthesis_total",
        "Guide synthesis attempts by outcome (parsed/fallback/empty/error)."
    );
    describe_counter!(
        "asset_resolve_total",
        "Asset resolutions by source (stored/fallback-search/static-placeholder)."
    );
    describe_histogram!("guide_build_ms", "End-to-end trip guide build time in milliseconds.");
}

/// Router exposing `/metrics` in the Prometheus exposition format.
pub fn router() -> Router {
    let handle = handle();
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}
