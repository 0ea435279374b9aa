//! Centralized error types for Skylog.
//!
//! The hierarchy keeps upstream provider failures distinguishable from local
//! ones: only `WeatherError::UpstreamRejected` carries detail meant for the
//! end caller, everything else collapses to a generic message.

use thiserror::Error;

/// Caller-visible message for a failed weather lookup.
pub const WEATHER_FETCH_FAILED: &str = "Failed to fetch weather data";

/// Caller-visible message for a failed history listing.
pub const HISTORY_FETCH_FAILED: &str = "Failed to fetch weather history";

/// Top-level application error type.
///
/// Use `user_message()` for text that is safe to show the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),
}

impl AppError {
    /// Message for the caller. Provider rejections carry their own message,
    /// see `WeatherError::UpstreamRejected`.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Database(_) => HISTORY_FETCH_FAILED,
            AppError::Weather(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// History storage errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

/// Weather resolution errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City name must not be empty")]
    EmptyCity,

    /// The provider answered with an error status and a structured message.
    #[error("Upstream rejected request: {status} - {message}")]
    UpstreamRejected { status: u16, message: String },

    /// Network failure, timeout or an unreadable provider response.
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::EmptyCity => "City name must not be empty",
            WeatherError::UpstreamRejected { .. } | WeatherError::UpstreamUnreachable(_) => {
                WEATHER_FETCH_FAILED
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
