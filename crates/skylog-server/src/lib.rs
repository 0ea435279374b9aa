//! HTTP API for Skylog: weather resolution and lookup history.

pub mod history;
pub mod reply;
pub mod resolution;
pub mod routes;

pub use history::HistoryQueryService;
pub use resolution::ResolutionService;
pub use routes::routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use skylog_core::Config;
use skylog_history::{HistoryClient, SqliteHistoryStore};
use skylog_provider::ProviderClient;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub resolution: Arc<ResolutionService>,
    pub history: Arc<HistoryQueryService>,
}

impl AppState {
    pub fn new(provider: ProviderClient, history: HistoryClient, recent_limit: usize) -> Self {
        Self {
            resolution: Arc::new(ResolutionService::new(provider, history.clone())),
            history: Arc::new(HistoryQueryService::with_limit(history, recent_limit)),
        }
    }

    /// Build the provider client and open the history database described by
    /// `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider =
            ProviderClient::new(&config.provider).context("Failed to create provider client")?;

        let db_path = config.database_path();
        let store = SqliteHistoryStore::new(&db_path)
            .with_context(|| format!("Failed to open history database {}", db_path.display()))?;
        tracing::info!("History database: {}", db_path.display());

        Ok(Self::new(
            provider,
            HistoryClient::sqlite(store),
            config.history.recent_limit,
        ))
    }
}
