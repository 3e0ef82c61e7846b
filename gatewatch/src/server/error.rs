//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::cache::CoordinatorError;
use crate::layout::LayoutError;

/// Errors a handler can answer with.
///
/// Upstream and store failures never reach this type; they are folded into
/// a stale 200 response by the coordinator.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown base '{0}'")]
    UnknownBase(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl From<CoordinatorError> for ApiError {
    fn from(error: CoordinatorError) -> Self {
        match error {
            CoordinatorError::UnknownBase(base) => Self::UnknownBase(base),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownBase(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Layout(LayoutError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Layout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
