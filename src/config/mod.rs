use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Base URL of the hosted project, e.g. https://xyzcompany.supabase.co
    pub url: String,
    /// Public anon key, sent with every request.
    pub anon_key: String,
    /// Privileged service-role key for server-side writes. Optional.
    pub service_role_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Where the storefront frontend is served from. Informational only:
    /// the CORS posture allows all origins with credentials disabled.
    pub frontend_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

impl AppConfig {
    /// Build configuration from the process environment. Missing Supabase
    /// credentials are fatal: the service cannot do anything useful without
    /// them, so it refuses to start rather than limp along with a dead
    /// client.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = environment_from(env::var("APP_ENV").ok().as_deref());

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar { var: "PORT", value })?,
            Err(_) => 3000,
        };

        Ok(Self {
            environment,
            server: ServerConfig { port },
            supabase: SupabaseConfig {
                url: require("SUPABASE_URL")?,
                anon_key: require("SUPABASE_ANON_KEY")?,
                service_role_key: optional("SUPABASE_SERVICE_ROLE_KEY"),
            },
            cors: CorsConfig {
                frontend_url: optional("FRONTEND_URL"),
            },
        })
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }
}

fn environment_from(value: Option<&str>) -> Environment {
    match value {
        Some("production") | Some("prod") => Environment::Production,
        _ => Environment::Development,
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(var))
}

fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}
