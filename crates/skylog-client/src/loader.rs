//! Read-through loaders for the history listing and the current weather.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use skylog_core::{Config, Coordinates, WeatherRecord};

use crate::api::WeatherApiClient;
use crate::cache::{CacheWrite, TtlCache, HISTORY_CACHE_KEY};
use crate::error::{ClientError, ClientResult};
use crate::storage::{CacheStorage, FileStorage};
use crate::summary::WeatherSummary;

/// City shown when the device location is unavailable.
pub const DEFAULT_CITY: &str = "Kyiv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Serve a fresh, non-empty cache entry if there is one.
    Passive,
    /// Always go to the network (user refresh).
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Cache,
    Network,
    /// The network failed; records are whatever the cache still held.
    Fallback,
}

#[derive(Debug)]
pub struct HistoryOutcome {
    pub records: Vec<WeatherRecord>,
    pub source: HistorySource,
    pub error: Option<ClientError>,
    /// When the records were last confirmed; `None` on fallback.
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct HistoryLoader {
    api: WeatherApiClient,
    cache: TtlCache<Vec<WeatherRecord>>,
}

impl HistoryLoader {
    pub fn new(api: WeatherApiClient, cache: TtlCache<Vec<WeatherRecord>>) -> Self {
        Self { api, cache }
    }

    /// Loader over the API and on-disk cache described by `config`.
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let api = WeatherApiClient::from_config(&config.client)?;
        let storage: Arc<dyn CacheStorage> = Arc::new(FileStorage::new(config.cache_dir())?);
        let cache = TtlCache::new(HISTORY_CACHE_KEY, storage).with_ttl(config.client.cache_ttl_ms);
        Ok(Self::new(api, cache))
    }

    pub fn cache(&self) -> &TtlCache<Vec<WeatherRecord>> {
        &self.cache
    }

    pub async fn fetch(&self, mode: FetchMode) -> HistoryOutcome {
        if mode == FetchMode::Passive {
            if let Some(records) = self.cache.read().into_option() {
                if !records.is_empty() {
                    tracing::debug!("Serving {} history records from cache", records.len());
                    return HistoryOutcome {
                        records,
                        source: HistorySource::Cache,
                        error: None,
                        updated_at: Some(Utc::now()),
                    };
                }
            }
        }

        match self.api.get_history().await {
            Ok(records) => {
                if self.cache.write(&records) == CacheWrite::Degraded {
                    tracing::warn!("History cache unavailable; continuing without it");
                }
                HistoryOutcome {
                    records,
                    source: HistorySource::Network,
                    error: None,
                    updated_at: Some(Utc::now()),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch history: {}", e);
                HistoryOutcome {
                    records: self.cache.read_stale().unwrap_or_default(),
                    source: HistorySource::Fallback,
                    error: Some(e),
                    updated_at: None,
                }
            }
        }
    }
}

/// Where the device is, if known.
pub trait LocationSource: Send + Sync {
    fn current_coordinates(&self) -> Option<Coordinates>;
}

/// A location source with a fixed answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

impl LocationSource for FixedLocation {
    fn current_coordinates(&self) -> Option<Coordinates> {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct LoadedWeather {
    pub city: String,
    pub weather: serde_json::Value,
}

impl LoadedWeather {
    pub fn summary(&self) -> WeatherSummary {
        WeatherSummary::from_payload(&self.weather)
    }
}

pub struct WeatherLoader {
    api: WeatherApiClient,
    location: Box<dyn LocationSource>,
}

impl WeatherLoader {
    pub fn new<L: LocationSource + 'static>(api: WeatherApiClient, location: L) -> Self {
        Self {
            api,
            location: Box::new(location),
        }
    }

    /// Weather for `city`, or for the device's current city when none is
    /// given.
    pub async fn load(&self, city: Option<&str>) -> ClientResult<LoadedWeather> {
        let city = match city {
            Some(city) => city.trim().to_string(),
            None => self.current_city().await,
        };
        let weather = self.api.get_weather(&city).await?;
        Ok(LoadedWeather { city, weather })
    }

    /// Name of the city at the device location, or `DEFAULT_CITY`.
    pub async fn current_city(&self) -> String {
        let Some(coords) = self.location.current_coordinates() else {
            return DEFAULT_CITY.to_string();
        };

        match self.api.get_weather_by_coordinates(coords).await {
            Ok(weather) => WeatherSummary::from_payload(&weather)
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_CITY.to_string()),
            Err(e) => {
                tracing::warn!("Error getting location: {}", e);
                DEFAULT_CITY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader_for(server: &MockServer, location: FixedLocation) -> WeatherLoader {
        WeatherLoader::new(WeatherApiClient::new(&server.uri()).unwrap(), location)
    }

    #[tokio::test]
    async fn test_no_location_defaults_to_kyiv() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("city", "Kyiv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "Kyiv"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let loader = loader_for(&mock_server, FixedLocation(None));
        let loaded = loader.load(None).await.unwrap();

        assert_eq!(loaded.city, "Kyiv");
        assert_eq!(loaded.summary().name.as_deref(), Some("Kyiv"));
    }

    #[tokio::test]
    async fn test_current_city_from_coordinates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/coordinates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "Lviv"})))
            .mount(&mock_server)
            .await;

        let loader = loader_for(&mock_server, FixedLocation(Some(Coordinates::new(49.84, 24.03))));

        assert_eq!(loader.current_city().await, "Lviv");
    }

    #[tokio::test]
    async fn test_coordinates_failure_falls_back() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/coordinates"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let loader = loader_for(&mock_server, FixedLocation(Some(Coordinates::new(0.0, 0.0))));

        assert_eq!(loader.current_city().await, DEFAULT_CITY);
    }

    #[tokio::test]
    async fn test_nameless_response_falls_back() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/coordinates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": ""})))
            .mount(&mock_server)
            .await;

        let loader = loader_for(&mock_server, FixedLocation(Some(Coordinates::new(0.0, 0.0))));

        assert_eq!(loader.current_city().await, DEFAULT_CITY);
    }

    #[tokio::test]
    async fn test_blank_city_rejected() {
        let mock_server = MockServer::start().await;
        let loader = loader_for(&mock_server, FixedLocation(None));

        let err = loader.load(Some("  ")).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyCity));
    }
}
