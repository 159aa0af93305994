use thiserror::Error;

#[derive(Error, Debug)]
pub enum VantageError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("empty response: {0}")]
    EmptyResponse(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("arithmetic overflow: {0}")]
    Overflow(String),
}

impl VantageError {
    /// True when the provider reported its own request limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, VantageError::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, VantageError>;
