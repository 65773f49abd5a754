//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// API-level error with its HTTP status mapping. The JSON body is always
/// `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Config(String),
    /// Upstream provider failure; mirrors the provider's HTTP status when
    /// one was reported.
    Upstream {
        status: Option<u16>,
        message: String,
    },
    Internal(String),
}

impl From<uian_core::Error> for ApiError {
    fn from(err: uian_core::Error) -> Self {
        match err {
            uian_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            uian_core::Error::CaseNotFound(id) => {
                ApiError::NotFound(format!("Case {} not found", id))
            }
            uian_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            uian_core::Error::Config(msg) => ApiError::Config(msg),
            uian_core::Error::Generation { status, message } => {
                ApiError::Upstream { status, message }
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    /// The HTTP status this error renders with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Config(msg)
            | ApiError::Internal(msg)
            | ApiError::Upstream { message: msg, .. } => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.message(),
        }));

        (status, body).into_response()
    }
}
