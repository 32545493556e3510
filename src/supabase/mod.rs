//! Client for the hosted Supabase REST surface: GoTrue for identity
//! (`/auth/v1`) and PostgREST for table data (`/rest/v1`).

pub mod auth;
pub mod error;
pub mod postgrest;

pub use auth::AuthResponse;
pub use error::SupabaseError;
pub use postgrest::TableRequest;

use reqwest::header::HeaderValue;
use url::Url;

use crate::config::SupabaseConfig;

/// One instance is built at startup and shared through application state.
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseClient {
    /// Build a client. The URL and keys are validated here so requests can
    /// never fail on malformed credentials later.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let base = Url::parse(&config.url)
            .map_err(|e| SupabaseError::InvalidConfig(format!("invalid SUPABASE_URL: {e}")))?;

        for key in [Some(&config.anon_key), config.service_role_key.as_ref()]
            .into_iter()
            .flatten()
        {
            HeaderValue::from_str(key).map_err(|_| {
                SupabaseError::InvalidConfig("API key contains invalid header characters".into())
            })?;
        }

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
