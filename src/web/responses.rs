//! Error-to-response mapping for the HTTP layer
//!
//! Every failure is surfaced to the UI verbatim as a short
//! `{"error": ...}` body and logged server-side. Client mistakes
//! (missing parameters, missing GPS data, unsupported formats) map to
//! 400; collaborator failures map to 502; everything else is a 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::errors::{AppError, ArchiveError, ExtractionError};

/// Wrapper so collaborator and pipeline errors convert straight into
/// HTTP responses with `?`.
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            AppError::Extraction(ExtractionError::MissingGpsData)
            | AppError::Extraction(ExtractionError::CoordinatesOutOfRange { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Extraction(ExtractionError::UnreadableExif { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Archive(ArchiveError::UnsupportedFormat { .. }) => StatusCode::BAD_REQUEST,
            AppError::Archive(ArchiveError::ProcessingFailed { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Collaborator(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration { .. } | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        if status.is_server_error() {
            error!("Request failed: {message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CollaboratorError;

    fn status_of(err: AppError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn client_mistakes_map_to_400() {
        assert_eq!(
            status_of(AppError::Extraction(ExtractionError::MissingGpsData)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::invalid_request("Latitude and longitude are required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Archive(ArchiveError::UnsupportedFormat {
                path: "x.bmp".into()
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn collaborator_failures_map_to_502() {
        assert_eq!(
            status_of(AppError::Collaborator(CollaboratorError::request_failed(
                "weather", "HTTP 503"
            ))),
            StatusCode::BAD_GATEWAY
        );
    }
}
