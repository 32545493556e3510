//! Registration, login, logout and identity introspection.

use axum::{extract::State, http::HeaderMap, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::non_empty;
use crate::error::ApiError;
use crate::middleware::{extract_bearer_token, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::supabase::SupabaseError;
use crate::validation::{validate_email, validate_password, validate_username};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    #[serde(rename = "marketingEmails", default)]
    pub marketing_emails: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/register (also mounted at /api/auth/signup)
///
/// Validates the supplied account fields, registers the identity, then
/// best-effort inserts the profile row. A failed profile insert is logged
/// and swallowed: the identity already exists upstream and signup must not
/// fail over it, at the cost of the occasional identity without a profile.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Value> {
    let mut field_errors = Map::new();
    if let Err(error) = validate_email(body.email.as_deref()) {
        field_errors.insert("email".to_string(), Value::String(error));
    }
    if let Err(errors) = validate_password(body.password.as_deref()) {
        field_errors.insert("password".to_string(), json!(errors));
    }
    let supplied_username = body.username.as_deref().filter(|u| !u.is_empty());
    if supplied_username.is_some() {
        if let Err(error) = validate_username(supplied_username) {
            field_errors.insert("username".to_string(), Value::String(error));
        }
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Validation failed", field_errors));
    }

    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();
    let username = match supplied_username {
        Some(username) => username.to_string(),
        // same default the web client applies: the email local part
        None => email.split('@').next().unwrap_or_default().to_string(),
    };

    let signup = state
        .supabase
        .sign_up(&email, &password, json!({ "username": &username }))
        .await?;

    if let Some(id) = signup.user.get("id").and_then(Value::as_str) {
        let profile = json!({
            "id": id,
            "username": username,
            "email": email,
            "marketing_emails": body.marketing_emails,
        });
        if let Err(err) = state
            .supabase
            .from_privileged("profiles")
            .insert_single(&profile)
            .await
        {
            tracing::warn!("profile insert failed for {}: {}", id, err);
        }
    }

    Ok(ApiResponse::created(json!({
        "message": "User registered successfully",
        "user": signup.user,
        "session": signup.session,
    })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Value> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let auth = state.supabase.sign_in_with_password(&email, &password).await?;

    Ok(ApiResponse::success(json!({
        "message": "Login successful",
        "user": auth.user,
        "session": auth.session,
    })))
}

/// POST /api/auth/logout
///
/// A presented token is revoked upstream; without one there is no session
/// to revoke and the call succeeds locally.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    if let Some(token) = extract_bearer_token(&headers) {
        state.supabase.sign_out(&token).await.map_err(|err| match err {
            SupabaseError::Api { message, .. } => ApiError::bad_request(message),
            other => ApiError::from(other),
        })?;
    }

    Ok(ApiResponse::success(json!({ "message": "Logout successful" })))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "user": user.record })))
}
