//! Location -> weather resolution.
//!
//! A lookup is at most two sequential provider calls (reverse geocode, then
//! weather) followed by one history write. The history write is best-effort.

use skylog_core::{AppError, Coordinates, LocationQuery, WeatherError, WeatherRecord, UNKNOWN_CITY};
use skylog_history::HistoryClient;
use skylog_provider::{first_place_name, ProviderClient, ProviderError};

pub struct ResolutionService {
    provider: ProviderClient,
    history: HistoryClient,
}

impl ResolutionService {
    pub fn new(provider: ProviderClient, history: HistoryClient) -> Self {
        Self { provider, history }
    }

    /// Resolve a location to current weather and record the lookup.
    ///
    /// # Errors
    /// - `WeatherError::EmptyCity` for a blank city name (no network call made).
    /// - `WeatherError::UpstreamRejected` when the provider answers with an error message.
    /// - `WeatherError::UpstreamUnreachable` for any other provider failure.
    pub async fn resolve(&self, query: LocationQuery) -> Result<WeatherRecord, AppError> {
        let (city, weather_data) = match query {
            LocationQuery::City(name) => {
                if name.trim().is_empty() {
                    return Err(WeatherError::EmptyCity.into());
                }
                let data = self
                    .provider
                    .weather_by_city(&name)
                    .await
                    .map_err(upstream_error)?;
                (name, data)
            }
            LocationQuery::Coordinates(coords) => {
                let places = self
                    .provider
                    .reverse_geocode(coords.lat, coords.lon)
                    .await
                    .map_err(upstream_error)?;
                let city = first_place_name(&places).unwrap_or(UNKNOWN_CITY).to_string();
                tracing::debug!("Reverse geocoded ({}, {}) to {}", coords.lat, coords.lon, city);

                // The resolved name only labels the record; weather is
                // looked up by the original coordinates.
                let data = self
                    .provider
                    .weather_by_coordinates(coords.lat, coords.lon)
                    .await
                    .map_err(upstream_error)?;
                (city, data)
            }
        };

        Ok(self.persist(city, weather_data).await)
    }

    pub async fn resolve_city(&self, name: &str) -> Result<WeatherRecord, AppError> {
        self.resolve(LocationQuery::City(name.to_string())).await
    }

    pub async fn resolve_coordinates(&self, coords: Coordinates) -> Result<WeatherRecord, AppError> {
        self.resolve(LocationQuery::Coordinates(coords)).await
    }

    async fn persist(&self, city: String, weather_data: serde_json::Value) -> WeatherRecord {
        match self.history.record(city.clone(), weather_data.clone()).await {
            Ok(record) => {
                tracing::info!("Recorded weather lookup for {}", record.city);
                record
            }
            Err(e) => {
                tracing::error!(city = %city, "Failed to persist weather history record: {}", e);
                WeatherRecord::new(city, weather_data)
            }
        }
    }
}

fn upstream_error(e: ProviderError) -> AppError {
    match &e {
        ProviderError::Rejected { status, message } => {
            tracing::info!("Provider rejected lookup: {} {}", status, message)
        }
        other => tracing::warn!("Weather fetch failed: {}", other),
    }
    WeatherError::from(e).into()
}
