//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{Method, Uri},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use diachi_core::traits::Geocoder;
use diachi_core::types::{GeoCoordinates, GeocodeDiagnostic, StreetQuery};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// Query string extraction that leaves the rejection to the handler.
type QueryResult<T> = std::result::Result<Query<T>, QueryRejection>;

const DEFAULT_TEST_ADDRESS: &str = "Hanoi, Vietnam";

// ═══════════════════════════════════════════════════════════════════════════
// Administrative Divisions
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/provinces
pub async fn list_provinces(
    State(state): State<Arc<AppState>>,
    query: QueryResult<DepthQuery>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    let provinces = state
        .provinces
        .list_provinces(query.depth_or(1))
        .await
        .map_err(|e| ApiError::from_geo(e, &state.config))?;
    Ok(Json(provinces))
}

/// GET /api/provinces/:code
pub async fn get_province(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    query: QueryResult<DepthQuery>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    let province = state
        .provinces
        .province(&code, query.depth_or(2))
        .await
        .map_err(|e| ApiError::from_geo(e, &state.config))?;
    Ok(Json(province))
}

/// GET /api/districts/:code
pub async fn get_district(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    query: QueryResult<DepthQuery>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    let district = state
        .provinces
        .district(&code, query.depth_or(2))
        .await
        .map_err(|e| ApiError::from_geo(e, &state.config))?;
    Ok(Json(district))
}

// ═══════════════════════════════════════════════════════════════════════════
// Geocoding
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/geocode
pub async fn geocode(
    State(state): State<Arc<AppState>>,
    query: QueryResult<AddressQuery>,
) -> Result<Json<GeoCoordinates>> {
    let Query(query) = query?;
    let address = query.address.unwrap_or_default();
    let coordinates = state
        .geocoder
        .geocode(&address)
        .await
        .map_err(|e| ApiError::from_geo(e, &state.config))?;

    info!(address = %address.trim(), lat = coordinates.lat, lng = coordinates.lng, "Geocoded address");
    Ok(Json(coordinates))
}

/// GET /api/test-geocode
pub async fn test_geocode(
    State(state): State<Arc<AppState>>,
    query: QueryResult<AddressQuery>,
) -> Result<Json<GeocodeDiagnostic>> {
    let Query(query) = query?;
    let address = query
        .address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_ADDRESS.to_string());

    let diagnostic = state
        .geocoder
        .test_geocode(&address)
        .await
        .map_err(|e| ApiError::from_geo(e, &state.config))?;
    Ok(Json(diagnostic))
}

// ═══════════════════════════════════════════════════════════════════════════
// Street Autocomplete
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/autocomplete-streets
///
/// Always 200; failures surface as an empty array, malformed query strings
/// included.
pub async fn autocomplete_streets(
    State(state): State<Arc<AppState>>,
    query: QueryResult<AutocompleteQuery>,
) -> Json<Vec<String>> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Malformed autocomplete query");
            return Json(Vec::new());
        }
    };

    let request = StreetQuery::from(query);
    let suggestions = state.suggester.suggest(&request).await;
    debug!(query = %request.query, count = suggestions.len(), "Autocomplete answered");
    Json(suggestions)
}

// ═══════════════════════════════════════════════════════════════════════════
// Health & Fallback
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running".into(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Any unmatched route.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} {} not found", method, uri.path()))
}
