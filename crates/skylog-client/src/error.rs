use thiserror::Error;

use crate::storage::StorageError;

/// Errors seen by consumers of the Skylog HTTP API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("HTTP error! status: {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("City name must not be empty")]
    EmptyCity,

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Cache storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// HTTP status for server-side rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_http_errors() {
        let err = ClientError::Http {
            status: 404,
            message: "city not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ClientError::Network("refused".into()).status(), None);
    }

    #[test]
    fn test_http_error_display() {
        let err = ClientError::Http {
            status: 500,
            message: "Failed to fetch weather history".into(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error! status: 500: Failed to fetch weather history"
        );
    }
}
