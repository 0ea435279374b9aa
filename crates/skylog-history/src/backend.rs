//! History storage backend trait and error types.
//!
//! The store is append-only: records are inserted once and only ever read
//! back as a "most recent N" listing.

use skylog_core::{AppError, DatabaseError, WeatherRecord};
use thiserror::Error;

/// Number of records served by the history listing.
pub const RECENT_HISTORY_LIMIT: usize = 100;

/// Errors that can occur during history backend operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Record rejected before reaching storage (blank city, missing payload).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage error (database unavailable, query failed).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored row could not be decoded.
    #[error("Corrupt history record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HistoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<HistoryError> for DatabaseError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::Corrupt(msg) => DatabaseError::Corruption(msg),
            other => DatabaseError::QueryFailed(other.to_string()),
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        AppError::Database(e.into())
    }
}

/// Result type for history backend operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Trait for history storage backends.
///
/// Implementations don't need to be Sync - `HistoryClient` serializes access
/// through a mutex.
pub trait HistoryStore: Send {
    /// Persist one record.
    ///
    /// # Errors
    /// Returns `HistoryError::Validation` if the record has a blank city or a
    /// null payload, `HistoryError::Storage` if the write fails.
    fn append(&self, record: &WeatherRecord) -> HistoryResult<()>;

    /// The `limit` most recent records, newest first.
    ///
    /// Records sharing a `created_at` come back latest insert first.
    fn find_recent(&self, limit: usize) -> HistoryResult<Vec<WeatherRecord>>;
}

/// Check a record before it is written.
///
/// # Errors
/// Returns `HistoryError::Validation` if:
/// - City is empty or whitespace-only.
/// - The weather payload is JSON `null`.
pub fn validate_record(record: &WeatherRecord) -> HistoryResult<()> {
    if record.city.trim().is_empty() {
        return Err(HistoryError::validation("City cannot be empty"));
    }

    if record.weather_data.is_null() {
        return Err(HistoryError::validation("Weather data is missing"));
    }

    Ok(())
}
