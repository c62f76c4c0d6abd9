use reqwest::StatusCode;
use thiserror::Error;

/// Failures from outbound provider calls.
///
/// These never reach the client: each task catches them at its boundary and
/// degrades to its fixed fallback value.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Api { status: StatusCode },

    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),

    #[error("generated text is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("image generation timed out after {checks} status checks")]
    PollTimeout { checks: u32 },
}

impl TaskError {
    /// The one transient signal worth retrying: the sentiment endpoint
    /// answering 503 while the model loads.
    pub fn is_service_busy(&self) -> bool {
        matches!(self, TaskError::Api { status } if *status == StatusCode::SERVICE_UNAVAILABLE)
    }
}
