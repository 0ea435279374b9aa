//! Append-only weather lookup history for Skylog.

pub mod backend;
pub mod client;
pub mod store;

pub use backend::{validate_record, HistoryError, HistoryResult, HistoryStore, RECENT_HISTORY_LIMIT};
pub use client::HistoryClient;
pub use store::SqliteHistoryStore;
