use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// One problem found while validating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Rejections raised at the boundary, before any simulation starts.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid JSON payload: {0}")]
    MalformedJson(String),

    #[error("request failed validation: {}", describe(.0))]
    Invalid(Vec<FieldIssue>),
}

impl RequestError {
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            RequestError::MalformedJson(_) => &[],
            RequestError::Invalid(issues) => issues,
        }
    }
}

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("not found")]
    NotFound,

    #[error("analysis task failed: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldIssue>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            ApiError::Request(RequestError::MalformedJson(_)) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_JSON", Vec::new())
            }
            ApiError::Request(err @ RequestError::Invalid(_)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.issues().to_vec(),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", Vec::new()),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    Vec::new(),
                )
            }
        };

        let error = match &self {
            ApiError::Internal(_) => "An internal error occurred".to_string(),
            ApiError::Request(RequestError::Invalid(_)) => "Validation failed".to_string(),
            other => other.to_string(),
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error,
                code,
                details,
            }),
        )
            .into_response();
        response.headers_mut().insert(
            axum::http::header::CACHE_CONTROL,
            axum::http::HeaderValue::from_static("no-store"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_lists_every_issue_in_display() {
        let err = RequestError::Invalid(vec![
            FieldIssue::new("debts", "is required"),
            FieldIssue::new("extraPayment", "must be >= 0"),
        ]);
        let text = err.to_string();
        assert!(text.contains("debts: is required"));
        assert!(text.contains("extraPayment: must be >= 0"));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn validation_error_maps_to_bad_request() {
        let err = ApiError::from(RequestError::Invalid(vec![FieldIssue::new("debts", "x")]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(axum::http::header::CACHE_CONTROL),
            Some(&axum::http::HeaderValue::from_static("no-store"))
        );
    }

    #[test]
    fn internal_error_maps_to_server_error() {
        let response = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }
}
