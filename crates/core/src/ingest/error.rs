use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("rate limited by {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ScrapeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
