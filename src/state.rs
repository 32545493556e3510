use std::sync::Arc;

use crate::config::AppConfig;
use crate::supabase::SupabaseClient;

/// Shared application state, cloned into every handler. The Supabase client
/// is constructed once in `main` and injected here rather than living in a
/// module-level singleton, so tests can substitute their own.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub supabase: SupabaseClient,
}

impl AppState {
    pub fn new(config: AppConfig, supabase: SupabaseClient) -> Self {
        Self {
            config: Arc::new(config),
            supabase,
        }
    }
}
