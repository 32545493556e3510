use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

use super::error::read_json;
use super::{SupabaseClient, SupabaseError};

/// PostgREST media type that asks for exactly one row as a bare object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

impl SupabaseClient {
    /// Start a query against a table, acting with the public anon key.
    pub fn from(&self, table: &str) -> TableRequest {
        TableRequest::new(
            self.http.clone(),
            self.endpoint(&format!("rest/v1/{table}")),
            self.anon_key.clone(),
        )
    }

    /// Start a query with the privileged service-role key when one is
    /// configured, falling back to the anon key otherwise. Used for
    /// server-side writes that row-level security would deny to anon.
    pub fn from_privileged(&self, table: &str) -> TableRequest {
        let key = self
            .service_role_key
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());
        TableRequest::new(
            self.http.clone(),
            self.endpoint(&format!("rest/v1/{table}")),
            key,
        )
    }
}

/// A single PostgREST request under construction: filters and modifiers
/// accumulate as query parameters, then a terminal method sends it.
#[derive(Debug, Clone)]
pub struct TableRequest {
    http: reqwest::Client,
    url: String,
    api_key: String,
    query: Vec<(String, String)>,
}

impl TableRequest {
    fn new(http: reqwest::Client, url: String, api_key: String) -> Self {
        Self {
            http,
            url,
            api_key,
            query: Vec::new(),
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.query.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.query.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.query.push(("order".to_string(), format!("{column}.desc")));
        self
    }

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        self.http
            .request(method, &self.url)
            .query(&self.query)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    /// GET all matching rows.
    pub async fn fetch(self) -> Result<Value, SupabaseError> {
        let res = self.request(Method::GET).send().await?;
        read_json(res).await
    }

    /// GET exactly one matching row; the store reports an error otherwise.
    pub async fn fetch_single(self) -> Result<Value, SupabaseError> {
        let res = self
            .request(Method::GET)
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;
        read_json(res).await
    }

    /// INSERT one row and return its stored representation.
    pub async fn insert_single(self, row: &Value) -> Result<Value, SupabaseError> {
        let res = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(row)
            .send()
            .await?;
        read_json(res).await
    }

    /// UPDATE matching rows and return the single stored representation.
    pub async fn update_single(self, changes: &Value) -> Result<Value, SupabaseError> {
        let res = self
            .request(Method::PATCH)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(changes)
            .send()
            .await?;
        read_json(res).await
    }

    /// DELETE matching rows.
    pub async fn delete(self) -> Result<(), SupabaseError> {
        let res = self.request(Method::DELETE).send().await?;
        read_json(res).await.map(|_| ())
    }
}
