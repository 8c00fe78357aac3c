//! HTTP error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mywords_core::Error;
use serde_json::json;

/// An error returned by a handler, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Backend { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self.0);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(Error::validation("x")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(Error::unauthenticated("x")).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError(Error::backend("deepseek", "x")).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError(Error::config("x")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
