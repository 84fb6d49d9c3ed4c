//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stc_core::LocatorError;
use stc_render::RenderError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Namespace or id in the request path is not acceptable.
    #[error("Invalid locator: {0}")]
    InvalidLocator(#[from] LocatorError),

    /// Render error from stc-render.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Response body could not be encoded.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidLocator(e) => (StatusCode::BAD_REQUEST, json!({"error": e.to_string()})),
            Self::Render(RenderError::NotFound(locator)) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Static content not found", "location": locator.to_string()}),
            ),
            Self::Render(e) => {
                tracing::error!(error = %e, "Failed to render static content");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
            Self::Json(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
