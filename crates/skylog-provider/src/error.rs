use serde::Deserialize;
use skylog_core::{NetworkError, WeatherError};
use thiserror::Error;

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-2xx status and an error message.
    #[error("Provider rejected request: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// The request could not be completed or the answer could not be read.
    #[error("Provider unreachable: {0}")]
    Unreachable(#[from] NetworkError),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Error body shape used by OpenWeatherMap, e.g.
/// `{"cod": "404", "message": "city not found"}`.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

impl ProviderError {
    /// Classify a non-2xx answer. Only a JSON body with a string `message`
    /// counts as a structured rejection.
    pub(crate) fn from_error_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<UpstreamErrorBody>(body) {
            Ok(parsed) => ProviderError::Rejected {
                status,
                message: parsed.message,
            },
            Err(_) => ProviderError::Unreachable(NetworkError::ServerError {
                status,
                message: body.chars().take(200).collect(),
            }),
        }
    }
}

impl From<ProviderError> for WeatherError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Rejected { status, message } => {
                WeatherError::UpstreamRejected { status, message }
            }
            other => WeatherError::UpstreamUnreachable(other.to_string()),
        }
    }
}
