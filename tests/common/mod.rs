#![allow(dead_code)]

//! Test harness: serves the API in-process against a stub standing in for
//! the hosted provider (GoTrue auth + PostgREST tables), so every route can
//! be driven end-to-end without network access or real credentials.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use marketgreen_api::config::{AppConfig, CorsConfig, Environment, ServerConfig, SupabaseConfig};
use marketgreen_api::supabase::SupabaseClient;
use marketgreen_api::AppState;

pub const USER_ID: &str = "00000000-0000-4000-8000-000000000001";
pub const ADMIN_ID: &str = "00000000-0000-4000-8000-000000000002";
pub const ORPHAN_ID: &str = "00000000-0000-4000-8000-000000000003";
pub const OTHER_ID: &str = "00000000-0000-4000-8000-000000000004";

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const ORPHAN_TOKEN: &str = "orphan-token";

pub const PRODUCT_ID: &str = "10000000-0000-4000-8000-000000000001";
pub const PRODUCT2_ID: &str = "10000000-0000-4000-8000-000000000002";
pub const ORDER_ID: &str = "20000000-0000-4000-8000-000000000001";
pub const OTHER_ORDER_ID: &str = "20000000-0000-4000-8000-000000000002";

/// Email the auth stub reports as already registered.
pub const TAKEN_EMAIL: &str = "taken@example.com";
/// Email that makes the profiles table reject the insert, for exercising
/// the best-effort write path.
pub const BREAK_PROFILES_EMAIL: &str = "breakprofiles@example.com";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub provider: StubState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Start the stub provider and the API, each on a free loopback port.
/// Listeners are bound before the serve tasks spawn, so requests can be
/// issued immediately.
pub async fn spawn_app() -> Result<TestApp> {
    let provider = StubState::seeded();

    let stub_listener = TcpListener::bind("127.0.0.1:0").await?;
    let stub_addr = stub_listener.local_addr()?;
    let stub_router = stub_provider_router(provider.clone());
    tokio::spawn(async move {
        axum::serve(stub_listener, stub_router).await.unwrap();
    });

    let config = AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port: 0 },
        supabase: SupabaseConfig {
            url: format!("http://{stub_addr}"),
            anon_key: "test-anon-key".to_string(),
            service_role_key: Some("test-service-key".to_string()),
        },
        cors: CorsConfig { frontend_url: None },
    };
    let supabase = SupabaseClient::new(&config.supabase)?;
    let app = marketgreen_api::app(AppState::new(config, supabase));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(TestApp {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        provider,
    })
}

/// In-memory tables behind the PostgREST stub, exposed so tests can assert
/// on side effects (e.g. the best-effort profile insert).
#[derive(Clone)]
pub struct StubState {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
}

impl StubState {
    pub fn seeded() -> Self {
        let mut tables = HashMap::new();
        tables.insert(
            "profiles".to_string(),
            vec![
                json!({
                    "id": USER_ID,
                    "username": "testuser",
                    "email": "test@example.com",
                    "role": "user",
                    "marketing_emails": false,
                    "created_at": "2025-01-01T00:00:00Z"
                }),
                json!({
                    "id": ADMIN_ID,
                    "username": "admin",
                    "email": "admin@example.com",
                    "role": "admin",
                    "marketing_emails": false,
                    "created_at": "2025-01-01T00:00:00Z"
                }),
            ],
        );
        tables.insert(
            "products".to_string(),
            vec![
                json!({
                    "id": PRODUCT_ID,
                    "name": "Organic Apples",
                    "price": 4.5,
                    "created_at": "2025-01-02T00:00:00Z"
                }),
                json!({
                    "id": PRODUCT2_ID,
                    "name": "Heirloom Tomatoes",
                    "price": 6.0,
                    "created_at": "2025-01-03T00:00:00Z"
                }),
            ],
        );
        tables.insert(
            "orders".to_string(),
            vec![
                json!({
                    "id": ORDER_ID,
                    "user_id": USER_ID,
                    "status": "pending",
                    "items": [{ "product_id": PRODUCT_ID, "quantity": 2 }],
                    "created_at": "2025-01-04T00:00:00Z"
                }),
                json!({
                    "id": OTHER_ORDER_ID,
                    "user_id": OTHER_ID,
                    "status": "pending",
                    "items": [],
                    "created_at": "2025-01-05T00:00:00Z"
                }),
            ],
        );
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

pub fn stub_provider_router(state: StubState) -> Router {
    Router::new()
        .route("/auth/v1/signup", post(auth_signup))
        .route("/auth/v1/token", post(auth_token))
        .route("/auth/v1/logout", post(auth_logout))
        .route("/auth/v1/user", get(auth_user))
        .route(
            "/rest/v1/:table",
            get(rest_get).post(rest_post).patch(rest_patch).delete(rest_delete),
        )
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

fn identity_for(token: &str) -> Option<(&'static str, &'static str)> {
    match token {
        USER_TOKEN => Some((USER_ID, "test@example.com")),
        ADMIN_TOKEN => Some((ADMIN_ID, "admin@example.com")),
        ORPHAN_TOKEN => Some((ORPHAN_ID, "orphan@example.com")),
        _ => None,
    }
}

fn bad_jwt() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "code": 401, "error_code": "bad_jwt", "msg": "invalid JWT" })),
    )
        .into_response()
}

async fn auth_signup(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if email == TAKEN_EMAIL {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "code": 422,
                "error_code": "user_already_exists",
                "msg": "User already registered"
            })),
        )
            .into_response();
    }

    // confirmation pending: a bare user record, no session
    Json(json!({
        "id": Uuid::new_v4().to_string(),
        "aud": "authenticated",
        "role": "authenticated",
        "email": email,
        "user_metadata": body.get("data").cloned().unwrap_or(Value::Null),
    }))
    .into_response()
}

async fn auth_token(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match (email, password) {
        ("test@example.com", "Password1!") => Json(json!({
            "access_token": USER_TOKEN,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token",
            "user": { "id": USER_ID, "email": "test@example.com" }
        }))
        .into_response(),
        ("unverified@example.com", _) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": 400,
                "error_code": "email_not_confirmed",
                "msg": "Email not confirmed"
            })),
        )
            .into_response(),
        ("throttled@example.com", _) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "code": 429,
                "error_code": "over_request_rate_limit",
                "msg": "Request rate limit reached"
            })),
        )
            .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": 400,
                "error_code": "invalid_credentials",
                "msg": "Invalid login credentials"
            })),
        )
            .into_response(),
    }
}

async fn auth_logout(headers: HeaderMap) -> Response {
    match bearer(&headers).and_then(identity_for) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => bad_jwt(),
    }
}

async fn auth_user(headers: HeaderMap) -> Response {
    match bearer(&headers).and_then(identity_for) {
        Some((id, email)) => Json(json!({
            "id": id,
            "aud": "authenticated",
            "role": "authenticated",
            "email": email,
        }))
        .into_response(),
        None => bad_jwt(),
    }
}

fn eq_filters(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(k, v)| v.strip_prefix("eq.").map(|v| (k.clone(), v.to_string())))
        .collect()
}

fn matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, want)| match row.get(column) {
        Some(Value::String(s)) => s == want,
        Some(other) => other.to_string() == *want,
        None => false,
    })
}

fn wants_single(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("vnd.pgrst.object+json"))
}

fn not_exactly_one() -> Response {
    (
        StatusCode::NOT_ACCEPTABLE,
        Json(json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned"
        })),
    )
        .into_response()
}

async fn rest_get(
    State(state): State<StubState>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let filters = eq_filters(&params);
    let mut rows: Vec<Value> = state
        .tables
        .lock()
        .unwrap()
        .get(&table)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|row| matches(row, &filters))
        .collect();

    if let Some(order) = params.iter().find(|(k, _)| k == "order").map(|(_, v)| v.clone()) {
        if let Some(column) = order.strip_suffix(".desc") {
            let column = column.to_string();
            rows.sort_by(|a, b| {
                let a = a.get(&column).and_then(Value::as_str).unwrap_or_default();
                let b = b.get(&column).and_then(Value::as_str).unwrap_or_default();
                b.cmp(a)
            });
        }
    }

    if wants_single(&headers) {
        if rows.len() == 1 {
            Json(rows.remove(0)).into_response()
        } else {
            not_exactly_one()
        }
    } else {
        Json(Value::Array(rows)).into_response()
    }
}

async fn rest_post(
    State(state): State<StubState>,
    Path(table): Path<String>,
    Json(mut row): Json<Value>,
) -> Response {
    if !row.is_object() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": "PGRST102", "message": "Empty or invalid json" })),
        )
            .into_response();
    }
    if table == "profiles" && row["email"] == BREAK_PROFILES_EMAIL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": "23514", "message": "new row violates check constraint" })),
        )
            .into_response();
    }

    if row.get("id").is_none() {
        row["id"] = json!(Uuid::new_v4().to_string());
    }
    if row.get("created_at").is_none() {
        row["created_at"] = json!("2025-06-01T00:00:00Z");
    }

    state
        .tables
        .lock()
        .unwrap()
        .entry(table)
        .or_default()
        .push(row.clone());

    (StatusCode::CREATED, Json(row)).into_response()
}

async fn rest_patch(
    State(state): State<StubState>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(changes): Json<Value>,
) -> Response {
    let Some(changes) = changes.as_object().cloned() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": "PGRST102", "message": "Empty or invalid json" })),
        )
            .into_response();
    };
    let filters = eq_filters(&params);

    let mut tables = state.tables.lock().unwrap();
    let rows = tables.entry(table).or_default();
    let mut updated = Vec::new();
    for row in rows.iter_mut().filter(|row| matches(row, &filters)) {
        for (key, value) in &changes {
            row[key.as_str()] = value.clone();
        }
        updated.push(row.clone());
    }

    if wants_single(&headers) {
        if updated.len() == 1 {
            Json(updated.remove(0)).into_response()
        } else {
            not_exactly_one()
        }
    } else {
        Json(Value::Array(updated)).into_response()
    }
}

async fn rest_delete(
    State(state): State<StubState>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let filters = eq_filters(&params);
    let mut tables = state.tables.lock().unwrap();
    let rows = tables.entry(table).or_default();
    rows.retain(|row| !matches(row, &filters));
    StatusCode::NO_CONTENT.into_response()
}
