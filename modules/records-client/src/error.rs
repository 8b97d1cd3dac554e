use leadscan_common::Retryable;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecordsError>;

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RecordsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RecordsError::Timeout(err.to_string())
        } else if err.is_decode() {
            RecordsError::Parse(err.to_string())
        } else {
            RecordsError::Network(err.to_string())
        }
    }
}

impl Retryable for RecordsError {
    fn is_retryable(&self) -> bool {
        match self {
            RecordsError::Network(_) | RecordsError::Timeout(_) => true,
            RecordsError::Api { status, .. } => *status == 429 || *status >= 500,
            RecordsError::Auth(_) | RecordsError::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses_are_retryable() {
        for status in [429, 500, 502, 503] {
            let err = RecordsError::Api {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "status {status} should be retryable");
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 401, 403, 404] {
            let err = RecordsError::Api {
                status,
                message: String::new(),
            };
            assert!(!err.is_retryable(), "status {status} should not retry");
        }
    }
}
