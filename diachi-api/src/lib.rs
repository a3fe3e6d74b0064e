//! # Diachi API Server
//!
//! REST API for Vietnamese address selection: administrative divisions,
//! geocoding and street autocomplete.
//!
//! ## Endpoints
//!
//! - `GET /api/provinces` - All provinces (`?depth=`)
//! - `GET /api/provinces/:code` - One province with its districts
//! - `GET /api/districts/:code` - One district with its wards
//! - `GET /api/geocode?address=` - Address to coordinates
//! - `GET /api/test-geocode?address=` - Raw geocoder diagnostics
//! - `GET /api/autocomplete-streets?q=&ward=&district=&province=` - Street suggestions
//! - `GET /api/health` - Liveness
//!
//! ## Example
//!
//! ```rust,ignore
//! use diachi_api::{ApiConfig, ApiServer};
//!
//! let config = ApiConfig::from_env();
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 5000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState, StreetSource};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use diachi_core::error::Result;

/// API server for diachi.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::from_state(AppState::new(config)?))
    }

    /// Creates a server around prepared state.
    pub fn from_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes and middleware configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let production = self.state.config.is_production();

        create_router(self.state.clone())
            .layer(CatchPanicLayer::custom(move |payload: Box<dyn std::any::Any + Send + 'static>| {
                error::panic_response(payload, production)
            }))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();

        for key in self.state.config.missing_keys() {
            warn!(key, "Provider key not configured; dependent routes will fail");
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            environment = %self.state.config.environment,
            "Diachi API server listening on {}",
            addr
        );

        axum::serve(listener, self.router()).await
    }
}

/// Starts the API server with configuration from the environment.
pub async fn start_server(port: u16) -> std::io::Result<()> {
    let config = ApiConfig::from_env();
    let server = ApiServer::new(config).map_err(std::io::Error::other)?;
    server.run(([0, 0, 0, 0], port)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_headers_present() {
        let server = ApiServer::new(ApiConfig::default()).unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
