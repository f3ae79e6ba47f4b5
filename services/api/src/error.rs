//! Custom error types for the API service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::envelope::Envelope;

/// Custom error type for the API service
///
/// Every variant maps to one status code; the conversion to the response
/// envelope happens here and nowhere else. Raw upstream detail stays in the
/// logs.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input; carries the violated constraints
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// A path or query parameter is not a structurally valid entity id
    #[error("Invalid {0} ID")]
    InvalidReference(&'static str),

    /// The requested entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The actor is not the owner of the record
    #[error("{0}")]
    Permission(&'static str),

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Database or asset-store call failed
    #[error("Internal server error")]
    Upstream(#[source] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Permission(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Constraint violations surface as sqlx database errors; everything
        // else is an opaque upstream failure.
        if let Some(sqlx::Error::Database(db)) = err.downcast_ref::<sqlx::Error>() {
            match db.code().as_deref() {
                Some("23505") => return ApiError::Conflict("Resource already exists".to_string()),
                Some("23503") => return ApiError::NotFound("Resource"),
                _ => {}
            }
        }
        ApiError::Upstream(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::from(anyhow::Error::new(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            ApiError::Validation(violations) => ("Validation failed".to_string(), violations),
            ApiError::Upstream(err) => {
                error!("Upstream failure: {:#}", err);
                ("Internal server error".to_string(), Vec::new())
            }
            other => (other.to_string(), Vec::new()),
        };

        Envelope::fail(status, message, errors).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidReference("video").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("Video").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Permission("You do not own this").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict("duplicate".to_string()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Upstream(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_detail_is_not_leaked() {
        let err = ApiError::Upstream(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_anyhow_passthrough_is_upstream() {
        let err: ApiError = anyhow::anyhow!("some repository failure").into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
