//! SQLite-based history storage implementation.
//!
//! Payloads are stored as JSON text; timestamps as fixed-width RFC 3339
//! strings so that text ordering matches chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::backend::{validate_record, HistoryError, HistoryResult, HistoryStore};
use skylog_core::WeatherRecord;

/// SQLite-based history storage.
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Open (or create) a history database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory history store (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weather_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL CHECK (city <> ''),
                weather_data TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_weather_history_created
                ON weather_history(created_at DESC, id DESC);
            "#,
        )?;
        Ok(())
    }

    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn decode_row(id: i64, city: String, data: &str, created_at: &str) -> HistoryResult<WeatherRecord> {
        let weather_data = serde_json::from_str(data)
            .map_err(|e| HistoryError::Corrupt(format!("row {}: payload: {}", id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| HistoryError::Corrupt(format!("row {}: timestamp: {}", id, e)))?;

        Ok(WeatherRecord {
            city,
            weather_data,
            created_at,
        })
    }

    /// Get the record count.
    pub fn count(&self) -> anyhow::Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM weather_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&self, record: &WeatherRecord) -> HistoryResult<()> {
        validate_record(record)?;

        let data = serde_json::to_string(&record.weather_data)
            .map_err(|e| HistoryError::validation(format!("Unserializable payload: {}", e)))?;

        self.conn
            .execute(
                "INSERT INTO weather_history (city, weather_data, created_at) VALUES (?1, ?2, ?3)",
                params![record.city, data, Self::format_timestamp(&record.created_at)],
            )
            .map_err(|e| HistoryError::storage(e.to_string()))?;

        tracing::debug!(
            "Stored history record {} for {}",
            self.conn.last_insert_rowid(),
            record.city
        );
        Ok(())
    }

    fn find_recent(&self, limit: usize) -> HistoryResult<Vec<WeatherRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, city, weather_data, created_at
                 FROM weather_history
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(|e| HistoryError::storage(e.to_string()))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| HistoryError::storage(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, city, data, created_at) =
                row.map_err(|e| HistoryError::storage(e.to_string()))?;
            records.push(Self::decode_row(id, city, &data, &created_at)?);
        }
        Ok(records)
    }
}
