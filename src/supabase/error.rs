use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupabaseError {
    /// The request never produced a provider response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an error status.
    #[error("provider error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The provider answered with a success status but a body we could not
    /// decode.
    #[error("decode error: {0}")]
    Decode(String),

    /// Client construction rejected the configured URL or keys.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Read a provider response: error statuses become `Api` errors, empty
/// success bodies become `Null`, everything else must parse as JSON.
pub(crate) async fn read_json(res: reqwest::Response) -> Result<Value, SupabaseError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(parse_api_error(status.as_u16(), &body));
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| SupabaseError::Decode(e.to_string()))
}

/// GoTrue and PostgREST disagree on error body shape, and GoTrue itself has
/// shipped several; take whichever code/message fields are present.
pub(crate) fn parse_api_error(status: u16, body: &str) -> SupabaseError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let code = parsed.as_ref().and_then(|v| {
        v.get("error_code")
            .and_then(Value::as_str)
            .or_else(|| v.get("code").and_then(Value::as_str))
            .map(str::to_string)
    });

    let message = parsed
        .as_ref()
        .and_then(|v| {
            v.get("msg")
                .or_else(|| v.get("message"))
                .or_else(|| v.get("error_description"))
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("provider returned status {status}")
            } else {
                body.to_string()
            }
        });

    SupabaseError::Api { status, code, message }
}
