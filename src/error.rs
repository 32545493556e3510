// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::supabase::SupabaseError;

/// Whether 500 responses include the underlying error detail. Enabled only
/// in development; set once at startup.
static EXPOSE_DETAIL: AtomicBool = AtomicBool::new(false);

pub fn expose_error_detail(enabled: bool) {
    EXPOSE_DETAIL.store(enabled, Ordering::Relaxed);
}

fn detail_exposed() -> bool {
    EXPOSE_DETAIL.load(Ordering::Relaxed)
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Map<String, Value>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::TooManyRequests(_) => 429,
            ApiError::InternalServerError { .. } => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR",
                    "field_errors": field_errors,
                })
            }
            ApiError::InternalServerError { message, detail } => {
                let mut body = json!({
                    "error": true,
                    "message": message,
                    "code": "INTERNAL_SERVER_ERROR",
                });
                if let (Some(detail), true) = (detail, detail_exposed()) {
                    body["detail"] = json!(detail);
                }
                body
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code(),
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Map<String, Value>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: None,
        }
    }

    pub fn internal_with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Structured provider error codes that override the provider's own status.
const PROVIDER_CODE_MAP: &[(&str, u16)] = &[
    ("user_already_exists", 409),
    ("email_exists", 409),
    ("phone_exists", 409),
    ("invalid_credentials", 401),
    ("invalid_grant", 401),
    ("bad_jwt", 401),
    ("email_not_confirmed", 403),
    ("phone_not_confirmed", 403),
    ("over_request_rate_limit", 429),
    ("over_email_send_rate_limit", 429),
];

/// Message-substring fallback for deployments that predate structured codes.
/// Fragile by nature, which is why it lives in exactly one place.
const PROVIDER_MESSAGE_MAP: &[(&str, u16)] = &[
    ("already registered", 409),
    ("already been registered", 409),
    ("Invalid login credentials", 401),
    ("Email not confirmed", 403),
    ("rate limit", 429),
];

/// Choose a client-facing status for a provider failure: structured code
/// first, message text second, the provider's own status class last.
pub fn map_provider_error(status: u16, code: Option<&str>, message: &str) -> ApiError {
    let mapped = code
        .and_then(|c| {
            PROVIDER_CODE_MAP
                .iter()
                .find(|(known, _)| *known == c)
                .map(|(_, status)| *status)
        })
        .or_else(|| {
            PROVIDER_MESSAGE_MAP
                .iter()
                .find(|(needle, _)| message.contains(needle))
                .map(|(_, status)| *status)
        })
        .unwrap_or(status);

    match mapped {
        401 => ApiError::unauthorized(message),
        403 => ApiError::forbidden(message),
        404 => ApiError::not_found(message),
        409 => ApiError::conflict(message),
        429 => ApiError::too_many_requests(message),
        400..=499 => ApiError::bad_request(message),
        _ => {
            tracing::error!("provider error {}: {}", status, message);
            ApiError::internal_with_detail("An unexpected error occurred", message)
        }
    }
}

impl From<SupabaseError> for ApiError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Api { status, code, message } => {
                map_provider_error(status, code.as_deref(), &message)
            }
            SupabaseError::Http(e) => {
                tracing::error!("provider request failed: {}", e);
                ApiError::internal_with_detail("An unexpected error occurred", e.to_string())
            }
            SupabaseError::Decode(msg) => {
                tracing::error!("provider response decode failed: {}", msg);
                ApiError::internal_with_detail("An unexpected error occurred", msg)
            }
            SupabaseError::InvalidConfig(msg) => {
                tracing::error!("supabase client misconfigured: {}", msg);
                ApiError::internal_server_error("An unexpected error occurred")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
