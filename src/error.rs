use std::time::Duration;

use thiserror::Error;
use wasm_bindgen::JsValue;

/// A single failed attempt to retrieve a JSON document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },

    #[error("invalid content type: {0}")]
    ContentType(String),

    #[error("malformed JSON: {0}")]
    Parse(String),
}

impl FetchError {
    /// Timeouts and 404s fail fast; everything else may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            FetchError::Timeout(_) | FetchError::Status { status: 404, .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("document is not available")]
    NoDocument,

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("{0} unavailable")]
    Unavailable(&'static str),

    #[error("critical initialization failed: {0}")]
    Critical(String),
}

impl From<JsValue> for AppError {
    fn from(value: JsValue) -> Self {
        AppError::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}
