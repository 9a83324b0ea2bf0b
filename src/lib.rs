// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

pub mod apps {
    #[cfg(feature = "pacientes")]
    pub mod pacientes;

    #[cfg(feature = "administrative")]
    pub mod administrative;

    #[cfg(feature = "auth")]
    pub mod auth;

    #[cfg(feature = "gateway")]
    pub mod gateway;
}

pub mod common;

/// Result alias used by every service and handler.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Implement IntoResponse for PlatformError.
impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            PlatformError::Internal(e) => {
                error!("Internal error: {e}");
                "Internal server error".to_string()
            }
            PlatformError::Validation(e)
            | PlatformError::NotFound(e)
            | PlatformError::Conflict(e)
            | PlatformError::Unauthorized(e)
            | PlatformError::Forbidden(e)
            | PlatformError::Upstream(e) => e,
        };
        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));
        (status, body).into_response()
    }
}

/// Platform errors enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Malformed input, missing field, disallowed state transition.
    Validation(String),
    NotFound(String),
    /// Duplicate document, CUPS code, username and similar uniqueness violations.
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    /// A gateway upstream could not be reached.
    Upstream(String),
    Internal(String),
}

impl PlatformError {
    pub fn status(&self) -> StatusCode {
        match self {
            PlatformError::Validation(_) => StatusCode::BAD_REQUEST,
            PlatformError::NotFound(_) => StatusCode::NOT_FOUND,
            PlatformError::Conflict(_) => StatusCode::CONFLICT,
            PlatformError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PlatformError::Forbidden(_) => StatusCode::FORBIDDEN,
            PlatformError::Upstream(_) => StatusCode::BAD_GATEWAY,
            PlatformError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Validation(e) => write!(f, "Validation error: {e}"),
            PlatformError::NotFound(e) => write!(f, "Not found: {e}"),
            PlatformError::Conflict(e) => write!(f, "Conflict: {e}"),
            PlatformError::Unauthorized(e) => write!(f, "Unauthorized: {e}"),
            PlatformError::Forbidden(e) => write!(f, "Forbidden: {e}"),
            PlatformError::Upstream(e) => write!(f, "Upstream error: {e}"),
            PlatformError::Internal(e) => write!(f, "Internal error: {e}"),
        }
    }
}

impl std::error::Error for PlatformError {}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = PlatformError::Internal("db exploded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PlatformError::Validation(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlatformError::Conflict(String::new()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PlatformError::Upstream(String::new()).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
