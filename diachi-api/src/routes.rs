//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))

        // Administrative divisions
        .route("/api/provinces", get(handlers::list_provinces))
        .route("/api/provinces/:code", get(handlers::get_province))
        .route("/api/districts/:code", get(handlers::get_district))
        .route("/api/addresses/provinces", get(handlers::list_provinces))
        .route("/api/addresses/provinces/:code", get(handlers::get_province))
        .route("/api/addresses/districts/:code", get(handlers::get_district))

        // Geocoding
        .route("/api/geocode", get(handlers::geocode))
        .route("/api/test-geocode", get(handlers::test_geocode))
        .route("/api/geocode/test", get(handlers::test_geocode))

        // Street autocomplete
        .route("/api/autocomplete-streets", get(handlers::autocomplete_streets))
        .route("/api/geocode/autocomplete", get(handlers::autocomplete_streets))

        .fallback(handlers::not_found)
        .with_state(state)
}
