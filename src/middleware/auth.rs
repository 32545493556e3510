use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Identity resolved from a bearer token, attached to the request for
/// downstream handlers.
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    /// Full identity record as returned by the provider.
    pub record: Value,
}

impl AuthUser {
    /// None when the record has no parseable id, in which case the token
    /// resolved to nothing usable.
    pub fn from_record(record: Value) -> Option<Self> {
        let id = record.get("id")?.as_str()?.parse().ok()?;
        let email = record
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(Self { id, email, record })
    }
}

/// Pull the bearer token out of the Authorization header. The `Bearer `
/// prefix is optional, matching what deployed clients actually send.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve the caller's bearer token against the identity provider and
/// attach the identity to the request. A missing token is rejected before
/// any provider call is made.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(request.headers()) else {
        return Err(ApiError::unauthorized("No token provided"));
    };

    let record = match state.supabase.get_user(&token).await {
        Ok(record) => record,
        Err(SupabaseError::Api { .. }) => {
            return Err(ApiError::unauthorized("Invalid or expired token"));
        }
        Err(err) => {
            tracing::error!("identity lookup failed: {}", err);
            return Err(ApiError::internal_with_detail(
                "Authentication failed",
                err.to_string(),
            ));
        }
    };

    let Some(user) = AuthUser::from_record(record) else {
        return Err(ApiError::unauthorized("Invalid or expired token"));
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Require an authenticated identity whose stored profile role is "admin".
/// Must run after `authenticate`; a missing identity reads as an
/// unauthenticated caller. Any ambiguity in the role lookup denies.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return Err(ApiError::unauthorized("Authentication required"));
    };

    let profile = state
        .supabase
        .from("profiles")
        .select("role")
        .eq("id", &user.id.to_string())
        .fetch_single()
        .await;

    match profile {
        Ok(profile) if profile.get("role").and_then(Value::as_str) == Some("admin") => {
            Ok(next.run(request).await)
        }
        Ok(_) | Err(SupabaseError::Api { .. }) => Err(ApiError::forbidden("Admin access required")),
        Err(err) => {
            tracing::error!("role lookup failed: {}", err);
            Err(ApiError::internal_with_detail(
                "Authorization failed",
                err.to_string(),
            ))
        }
    }
}
