pub mod auth;
pub mod orders;
pub mod products;
pub mod users;

use crate::error::ApiError;
use crate::supabase::SupabaseError;

/// Treat empty strings as absent; request bodies arrive with both.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Single-row lookups read every store-side failure as a missing record;
/// only transport-level failures stay internal.
pub(crate) fn lookup_miss(err: SupabaseError, message: &str) -> ApiError {
    match err {
        SupabaseError::Api { .. } => ApiError::not_found(message),
        other => ApiError::from(other),
    }
}
