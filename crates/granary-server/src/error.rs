use crate::models::ErrorDto;

use granary_ingest::IngestError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Top-level API error type; every handler returns `Result<_, ApiError>` and
/// the `IntoResponse` impl maps variants onto status codes.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database operation error from the MongoDB driver.
    #[error(transparent)]
    DbErr(#[from] mongodb::error::Error),

    /// Engine failure while running a chat turn.
    #[error(transparent)]
    EngineErr(#[from] anyhow::Error),

    /// Resource not found; carries the client-facing message.
    #[error("{0}")]
    NotFound(String),

    /// Invalid request; carries the client-facing message.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error with a client-facing message.
    #[error("{0}")]
    InternalError(String),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        if err.is_invalid_input() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::InternalError(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorDto { error: msg })).into_response()
            }
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorDto { error: msg })).into_response()
            }
            Self::InternalError(msg) => {
                log::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorDto { error: msg }))
                    .into_response()
            }
            err => {
                log::error!("{}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorDto {
                        error: "Internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound("Conversation not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let response = ApiError::BadRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_errors_map_to_500() {
        let response = ApiError::EngineErr(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_input_ingest_errors_become_bad_requests() {
        let err: ApiError = IngestError::UnsupportedType.into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = IngestError::Process("embedder down".to_string()).into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }
}
