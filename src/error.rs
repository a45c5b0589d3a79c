use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReciteError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("rate limit from {0}, retry after {1}s")]
    RateLimit(String, u64),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("timed out fetching {0}")]
    Timeout(String),

    #[error("invalid style configuration: {0}")]
    InvalidStyle(String),
}

pub type Result<T> = std::result::Result<T, ReciteError>;
