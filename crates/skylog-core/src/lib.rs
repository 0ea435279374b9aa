pub mod config;
pub mod error;
pub mod types;

pub use config::{ClientConfig, Config, HistoryConfig, ProviderConfig, ServerConfig};
pub use error::{
    AppError, DatabaseError, NetworkError, ReqwestErrorExt, WeatherError, HISTORY_FETCH_FAILED,
    WEATHER_FETCH_FAILED,
};
pub use types::{Coordinates, LocationQuery, WeatherRecord, UNKNOWN_CITY};

use anyhow::Result;

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Skylog core initialized");
    Ok(())
}
