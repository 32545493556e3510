//! Order creation and listing, scoped to the authenticated caller.
//!
//! The status-update endpoint has no auth or ownership check (see
//! DESIGN.md), matching the deployed behavior.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{lookup_miss, non_empty};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let orders = state
        .supabase
        .from("orders")
        .select("*")
        .eq("user_id", &user.id.to_string())
        .order_desc("created_at")
        .fetch()
        .await?;

    Ok(ApiResponse::success(orders))
}

/// GET /api/orders/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let order = state
        .supabase
        .from("orders")
        .select("*")
        .eq("id", &id)
        .eq("user_id", &user.id.to_string())
        .fetch_single()
        .await
        .map_err(|err| lookup_miss(err, "Order not found"))?;

    Ok(ApiResponse::success(order))
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(order): Json<Value>,
) -> ApiResult<Value> {
    let Value::Object(mut order) = order else {
        return Err(ApiError::bad_request("Order must be a JSON object"));
    };
    // Owner and initial status always come from the server, never the caller.
    order.insert("user_id".to_string(), json!(user.id));
    order.insert("status".to_string(), json!("pending"));

    let created = state
        .supabase
        .from("orders")
        .insert_single(&Value::Object(order))
        .await?;

    Ok(ApiResponse::created(created))
}

/// PUT /api/orders/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<Value> {
    let Some(status) = non_empty(body.status) else {
        return Err(ApiError::bad_request("Status is required"));
    };

    let updated = state
        .supabase
        .from("orders")
        .eq("id", &id)
        .update_single(&json!({ "status": status }))
        .await?;

    Ok(ApiResponse::success(updated))
}
