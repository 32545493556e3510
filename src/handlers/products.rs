//! Product catalog CRUD.
//!
//! Reads are public. Mutations currently are too: there is no admin gate on
//! create/update/delete yet (see DESIGN.md), matching the deployed behavior.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use super::lookup_miss;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/products
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let products = state
        .supabase
        .from("products")
        .select("*")
        .order_desc("created_at")
        .fetch()
        .await?;

    Ok(ApiResponse::success(products))
}

/// GET /api/products/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let product = state
        .supabase
        .from("products")
        .select("*")
        .eq("id", &id)
        .fetch_single()
        .await
        .map_err(|err| lookup_miss(err, "Product not found"))?;

    Ok(ApiResponse::success(product))
}

/// POST /api/products
pub async fn create(State(state): State<AppState>, Json(product): Json<Value>) -> ApiResult<Value> {
    if !product.is_object() {
        return Err(ApiError::bad_request("Product must be a JSON object"));
    }

    let created = state
        .supabase
        .from("products")
        .insert_single(&product)
        .await?;

    Ok(ApiResponse::created(created))
}

/// PUT /api/products/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<Value>,
) -> ApiResult<Value> {
    if !updates.is_object() {
        return Err(ApiError::bad_request("Product updates must be a JSON object"));
    }

    let updated = state
        .supabase
        .from("products")
        .eq("id", &id)
        .update_single(&updates)
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/products/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    state.supabase.from("products").eq("id", &id).delete().await?;

    Ok(ApiResponse::success(json!({ "message": "Product deleted successfully" })))
}
