use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("GitHub server error: HTTP {0}")]
    ServerError(u16),

    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("GraphQL error: {0}")]
    GraphQL(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Organization not found or not accessible: {0}")]
    OrganizationNotFound(String),

    #[error("Gave up after {0} attempts")]
    RetriesExhausted(u32),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Transport failures, 5xx responses and explicit throttling are worth
    /// another attempt. Everything else fails the call immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ServerError(_) | Error::RateLimited(_) => true,
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Expected failures caused by private resources the token cannot see.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::AccessDenied(_))
    }
}
