use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level errors for the AR CyberGuard platform.
///
/// Every variant maps to one HTTP status and a stable `code` string so
/// clients can branch without parsing the human-readable message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateIdentity(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Phone verification required")]
    PhoneNotVerified { phone_number: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ProviderFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateIdentity(_) | ApiError::ProviderFailure(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PhoneNotVerified { .. } | ApiError::InvalidToken | ApiError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::DuplicateIdentity(_) => "duplicate_identity",
            ApiError::InvalidCredentials(_) => "invalid_credentials",
            ApiError::PhoneNotVerified { .. } => "phone_not_verified",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::InvalidToken => "invalid_token",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::ProviderFailure(_) => "provider_failure",
            ApiError::Database(_) => "internal_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::PhoneNotVerified { phone_number } => json!({
                "error": self.to_string(),
                "code": self.code(),
                "requiresPhoneVerification": true,
                "phoneNumber": phone_number,
            }),
            // Server-side details stay in the logs, not the response.
            ApiError::Database(err) => {
                tracing::error!(error = %err, "database error");
                json!({ "error": "Internal server error", "code": self.code() })
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                json!({ "error": "Internal server error", "code": self.code() })
            }
            _ => json!({ "error": self.to_string(), "code": self.code() }),
        };

        (status, Json(body)).into_response()
    }
}
