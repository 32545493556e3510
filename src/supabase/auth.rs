use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

use super::error::read_json;
use super::{SupabaseClient, SupabaseError};

/// Normalized result of a GoTrue sign-up or sign-in call.
///
/// The raw endpoints return either a session object (password grant, or
/// sign-up with auto-confirm enabled) or a bare user record (sign-up pending
/// email confirmation). Callers always get both views, with `session` None
/// in the second case.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub user: Value,
    pub session: Option<Value>,
}

impl AuthResponse {
    fn from_value(value: Value) -> Self {
        if value.get("access_token").is_some() {
            let user = value.get("user").cloned().unwrap_or(Value::Null);
            Self {
                user,
                session: Some(value),
            }
        } else {
            Self {
                user: value,
                session: None,
            }
        }
    }
}

impl SupabaseClient {
    /// Register a new identity. `metadata` lands in the identity's
    /// user-metadata blob.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthResponse, SupabaseError> {
        let res = self
            .http
            .post(self.endpoint("auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        Ok(AuthResponse::from_value(read_json(res).await?))
    }

    /// Exchange email and password for a session.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, SupabaseError> {
        let res = self
            .http
            .post(self.endpoint("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(AuthResponse::from_value(read_json(res).await?))
    }

    /// Revoke the session behind `token`.
    pub async fn sign_out(&self, token: &str) -> Result<(), SupabaseError> {
        let res = self
            .http
            .post(self.endpoint("auth/v1/logout"))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        read_json(res).await.map(|_| ())
    }

    /// Resolve a bearer token to the identity record it belongs to.
    pub async fn get_user(&self, token: &str) -> Result<Value, SupabaseError> {
        let res = self
            .http
            .get(self.endpoint("auth/v1/user"))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        read_json(res).await
    }
}
