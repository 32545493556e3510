//! Profile read and update for the authenticated caller.

use axum::{extract::State, Extension, Json};
use serde_json::Value;

use super::lookup_miss;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let profile = state
        .supabase
        .from("profiles")
        .select("*")
        .eq("id", &user.id.to_string())
        .fetch_single()
        .await
        .map_err(|err| lookup_miss(err, "Profile not found"))?;

    Ok(ApiResponse::success(profile))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(updates): Json<Value>,
) -> ApiResult<Value> {
    let Value::Object(mut updates) = updates else {
        return Err(ApiError::bad_request("Profile updates must be a JSON object"));
    };
    // The id is fixed by the token, and the role is never writable here.
    updates.remove("id");
    updates.remove("role");

    let profile = state
        .supabase
        .from("profiles")
        .eq("id", &user.id.to_string())
        .update_single(&Value::Object(updates))
        .await?;

    Ok(ApiResponse::success(profile))
}
