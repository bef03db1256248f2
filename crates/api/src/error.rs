use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use autofill::AutofillError;

/// Error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// HTTP face of [`AutofillError`]. Every kind maps to 500 with `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError(pub AutofillError);

impl From<AutofillError> for ApiError {
    fn from(err: AutofillError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.0.to_string();
        tracing::error!(kind = self.0.kind(), detail = %detail, "Autofill request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { detail }),
        )
            .into_response()
    }
}
