//! Uniform response envelope for the API boundary
//!
//! Every handler, success or failure, goes through this wrapper. Nothing
//! upstream of it writes raw data to the HTTP boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Uniform success/error wrapper returned by every endpoint.
///
/// `success` is derived from the status code, never set independently.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = ()> {
    pub success: bool,
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub errors: Vec<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a successful payload.
    pub fn ok(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            success: status.as_u16() < 400,
            status_code: status.as_u16(),
            data: Some(data),
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

impl Envelope<()> {
    /// Wrap a failure; `errors` lists violated constraints where known.
    pub fn fail(status: StatusCode, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: status.as_u16() < 400,
            status_code: status.as_u16(),
            data: None,
            message: message.into(),
            errors,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_derived_from_status() {
        let ok = Envelope::ok(StatusCode::CREATED, 42, "created");
        assert!(ok.success);
        assert_eq!(ok.status_code, 201);

        let fail = Envelope::fail(StatusCode::NOT_FOUND, "missing", vec![]);
        assert!(!fail.success);
        assert_eq!(fail.status_code, 404);
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let env = Envelope::ok(StatusCode::OK, "payload", "done");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "payload");
        assert_eq!(json["message"], "done");
        assert_eq!(json["errors"], serde_json::json!([]));
    }

    #[test]
    fn test_failure_carries_null_data_and_errors() {
        let env = Envelope::fail(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            vec!["title is required".to_string()],
        );
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(json["errors"][0], "title is required");
    }
}
