use skylog_core::{AppError, WeatherRecord};
use skylog_history::{HistoryClient, RECENT_HISTORY_LIMIT};

/// Read side of the lookup history.
pub struct HistoryQueryService {
    history: HistoryClient,
    limit: usize,
}

impl HistoryQueryService {
    pub fn new(history: HistoryClient) -> Self {
        Self::with_limit(history, RECENT_HISTORY_LIMIT)
    }

    pub fn with_limit(history: HistoryClient, limit: usize) -> Self {
        Self { history, limit }
    }

    /// Most recent lookups, newest first. Store failures are returned as-is.
    pub async fn recent(&self) -> Result<Vec<WeatherRecord>, AppError> {
        let records = self.history.find_recent(self.limit).await?;
        tracing::debug!("Loaded {} history records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use skylog_core::DatabaseError;
    use skylog_history::{HistoryError, HistoryResult, HistoryStore, SqliteHistoryStore};

    struct UnavailableStore;

    impl HistoryStore for UnavailableStore {
        fn append(&self, _record: &WeatherRecord) -> HistoryResult<()> {
            Ok(())
        }

        fn find_recent(&self, _limit: usize) -> HistoryResult<Vec<WeatherRecord>> {
            Err(HistoryError::storage("unable to open database file"))
        }
    }

    #[tokio::test]
    async fn test_recent_is_capped_and_ordered() {
        let history = HistoryClient::sqlite(SqliteHistoryStore::in_memory().unwrap());
        for i in 0..120 {
            let mut record = WeatherRecord::new(format!("City {}", i), serde_json::json!({ "i": i }));
            record.created_at += chrono::Duration::seconds(i);
            history.append(record).await.unwrap();
        }

        let service = HistoryQueryService::new(history);
        let records = service.recent().await.unwrap();

        assert_eq!(records.len(), 100);
        assert_eq!(records[0].city, "City 119");
        assert!(records.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let service = HistoryQueryService::new(HistoryClient::new(UnavailableStore));
        let result = service.recent().await;

        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::QueryFailed(_)))
        ));
    }
}
