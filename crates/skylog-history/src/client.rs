//! Async access to a history store.
//!
//! Store operations are blocking (SQLite); they run on the blocking pool and
//! are serialized through a mutex, so concurrent appends never interleave.

use std::sync::Arc;

use parking_lot::Mutex;
use skylog_core::WeatherRecord;

use crate::backend::{HistoryError, HistoryResult, HistoryStore};
use crate::store::SqliteHistoryStore;

/// Shared, cloneable handle to a history store.
#[derive(Clone)]
pub struct HistoryClient {
    store: Arc<Mutex<Box<dyn HistoryStore>>>,
}

impl HistoryClient {
    pub fn new<S: HistoryStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    /// Create a client over a SQLite store.
    pub fn sqlite(store: SqliteHistoryStore) -> Self {
        Self::new(store)
    }

    /// Persist one record.
    pub async fn append(&self, record: WeatherRecord) -> HistoryResult<()> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.lock().append(&record))
            .await
            .map_err(|e| HistoryError::Other(anyhow::anyhow!("History task failed: {}", e)))?
    }

    /// Build and persist a record for a lookup that just happened.
    ///
    /// The timestamp is taken while the store lock is held, so `created_at`
    /// order always matches insertion order.
    pub async fn record(
        &self,
        city: String,
        weather_data: serde_json::Value,
    ) -> HistoryResult<WeatherRecord> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let store = store.lock();
            let record = WeatherRecord::new(city, weather_data);
            store.append(&record)?;
            Ok(record)
        })
        .await
        .map_err(|e| HistoryError::Other(anyhow::anyhow!("History task failed: {}", e)))?
    }

    /// The `limit` most recent records, newest first.
    pub async fn find_recent(&self, limit: usize) -> HistoryResult<Vec<WeatherRecord>> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.lock().find_recent(limit))
            .await
            .map_err(|e| HistoryError::Other(anyhow::anyhow!("History task failed: {}", e)))?
    }
}

impl std::fmt::Debug for HistoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[tokio::test]
    async fn test_append_then_find() {
        let client = HistoryClient::sqlite(SqliteHistoryStore::in_memory().unwrap());

        client
            .append(WeatherRecord::new("Kyiv", serde_json::json!({"temp": 5})))
            .await
            .unwrap();

        let records = client.find_recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "Kyiv");
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_land() {
        let client = HistoryClient::sqlite(SqliteHistoryStore::in_memory().unwrap());

        let mut handles = Vec::new();
        for i in 0..20 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client
                    .append(WeatherRecord::new(
                        format!("City {}", i),
                        serde_json::json!({ "i": i }),
                    ))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = client.find_recent(100).await.unwrap();
        assert_eq!(records.len(), 20);
        assert!(records.iter().all(|r| r.weather_data["i"].is_number()));
    }

    /// Keeps records in the order the store received them.
    #[derive(Clone, Default)]
    struct ArrivalLog(Arc<Mutex<Vec<WeatherRecord>>>);

    impl HistoryStore for ArrivalLog {
        fn append(&self, record: &WeatherRecord) -> HistoryResult<()> {
            self.0.lock().push(record.clone());
            Ok(())
        }

        fn find_recent(&self, limit: usize) -> HistoryResult<Vec<WeatherRecord>> {
            Ok(self.0.lock().iter().rev().take(limit).cloned().collect())
        }
    }

    #[tokio::test]
    async fn test_concurrent_records_stamped_in_arrival_order() {
        let log = ArrivalLog::default();
        let client = HistoryClient::new(log.clone());

        let mut handles = Vec::new();
        for i in 0..50 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client
                    .record(format!("City {}", i), serde_json::json!({ "i": i }))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let arrived = log.0.lock().clone();
        assert_eq!(arrived.len(), 50);
        assert!(arrived.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_record_returns_stored_record() {
        let client = HistoryClient::sqlite(SqliteHistoryStore::in_memory().unwrap());

        let record = client
            .record("Kyiv".to_string(), serde_json::json!({"temp": 5}))
            .await
            .unwrap();

        let stored = client.find_recent(1).await.unwrap();
        assert_eq!(stored[0].city, record.city);
        assert_eq!(
            stored[0].created_at.timestamp_micros(),
            record.created_at.timestamp_micros()
        );
    }
}
