//! Route tables and global middleware.

use axum::{
    http::{header, Method, Uri},
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::handlers::{auth, orders, products, users};
use crate::middleware::{authenticate, security_headers};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/users", user_routes(state.clone()))
        .nest("/api/products", product_routes(state.clone()))
        .nest("/api/orders", order_routes(state))
        .fallback(not_found)
        // Global middleware
        .layer(from_fn(security_headers))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(auth::me))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .merge(
            Router::new()
                // both spellings the deployed clients use, one handler
                .route("/register", post(auth::register))
                .route("/signup", post(auth::register))
                .route("/login", post(auth::login))
                .route("/logout", post(auth::logout)),
        )
        .with_state(state)
}

fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/profile", get(users::get_profile).put(users::update_profile))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/:id",
            get(products::get)
                .put(products::update)
                .delete(products::remove),
        )
        .with_state(state)
}

fn order_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/:id", get(orders::get))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .merge(Router::new().route("/:id/status", put(orders::update_status)))
        .with_state(state)
}

/// We never serve cookies or read browser credentials, so allowing every
/// origin with credentials disabled is the safe permissive posture.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "MarketGreen API is running",
        "timestamp": chrono::Utc::now(),
    }))
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot {} {}", method, uri.path()))
}
