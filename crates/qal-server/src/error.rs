//! API error type and the JSON error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use qal_db::error::DatabaseError;

/// Request-level errors, each mapping to one status code. Every error
/// response carries the same `{"error": "..."}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub(crate) const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Storage(ref detail) = self {
            tracing::error!(%detail, "storage error");
        }
        let body = Json(json!({"error": self.to_string()}));
        (self.status(), body).into_response()
    }
}

/// Map a repo error to the endpoint's not-found wording; anything that is
/// not `NoResult` is a storage failure.
pub(crate) fn not_found_as(err: DatabaseError, message: &str) -> ApiError {
    match err {
        DatabaseError::NoResult => ApiError::NotFound(message.to_string()),
        other => ApiError::Storage(other.to_string()),
    }
}

/// Map a repo error where not-found is impossible (unscoped queries).
pub(crate) fn storage(err: DatabaseError) -> ApiError {
    ApiError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_codes_per_variant() {
        assert_eq!(
            ApiError::Validation("bad id".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("PnL not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Storage("disk full".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn no_result_takes_the_endpoint_wording() {
        let err = not_found_as(DatabaseError::NoResult, "PnL not found");
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "PnL not found"));

        let err = not_found_as(DatabaseError::Query("boom".into()), "PnL not found");
        assert!(matches!(err, ApiError::Storage(_)));
    }

    #[test]
    fn response_carries_variant_status() {
        let resp = ApiError::NotFound("Metrics history not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
