pub mod auth;
pub mod response;
pub mod security_headers;

pub use auth::{authenticate, extract_bearer_token, require_admin, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use security_headers::security_headers;
