use leadscan_common::Retryable;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrmError>;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CrmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CrmError::Timeout(err.to_string())
        } else if err.is_decode() {
            CrmError::Parse(err.to_string())
        } else {
            CrmError::Network(err.to_string())
        }
    }
}

impl Retryable for CrmError {
    fn is_retryable(&self) -> bool {
        match self {
            CrmError::Network(_) | CrmError::Timeout(_) => true,
            CrmError::Api { status, .. } => *status == 429 || *status >= 500,
            CrmError::Parse(_) => false,
        }
    }
}
