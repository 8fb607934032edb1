// src/ai/error.rs
use reqwest::StatusCode;
use thiserror::Error;

pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Every way a single classification attempt can fail. None of these are
/// fatal to the process; the caller reports and moves on.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("inference API returned {status}: {message}")]
    HttpStatus { status: StatusCode, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("inference API returned no results")]
    EmptyResult,
}

impl ClassifyError {
    /// Build from a non-success response body. The hosted API wraps its
    /// reason as `{"error": "..."}`; fall back to the raw text otherwise.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());

        ClassifyError::HttpStatus { status, message }
    }

    /// Worth trying again by hand: transport failures and a model that is
    /// still loading (503). Nothing retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClassifyError::Network(_) => true,
            ClassifyError::HttpStatus { status, .. } => *status == StatusCode::SERVICE_UNAVAILABLE,
            _ => false,
        }
    }
}
