//! API error handling.

use std::any::Any;

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use diachi_core::error::GeoError;

use crate::state::ApiConfig;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Attaches a diagnostic detail, shown outside production only.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Maps a provider error to its HTTP form.
    ///
    /// Configuration problems are reported as a generic server error; details
    /// are dropped in production.
    pub fn from_geo(err: GeoError, config: &ApiConfig) -> Self {
        let api_error = match &err {
            GeoError::InvalidInput(message) => ApiError::bad_request(message.clone()),
            GeoError::NotFound(message) => ApiError::not_found(message.clone()),
            GeoError::ConfigError(_) => {
                error!(error = %err, "Configuration error");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error",
                    "CONFIG_ERROR",
                )
                .with_detail(err.to_string())
            }
            GeoError::UpstreamFailure { .. }
            | GeoError::HttpError(_)
            | GeoError::Timeout { .. }
            | GeoError::JsonError(_) => {
                error!(error = %err, "Upstream provider failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "UPSTREAM_ERROR",
                )
                .with_detail(err.to_string())
            }
        };

        if config.is_production() {
            api_error.without_detail()
        } else {
            api_error
        }
    }

    fn without_detail(mut self) -> Self {
        self.detail = None;
        self
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code,
            message: self.message,
            error: self.detail,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Turns a caught handler panic into a 500 response.
pub(crate) fn panic_response(payload: Box<dyn Any + Send + 'static>, production: bool) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "Handler panicked");

    let api_error = ApiError::internal("Internal Server Error");
    if production {
        api_error.into_response()
    } else {
        api_error.with_detail(detail).into_response()
    }
}
