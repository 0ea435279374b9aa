use reqwest::Client;
use serde::de::DeserializeOwned;
use skylog_core::{NetworkError, ProviderConfig, ReqwestErrorExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ProviderError, ProviderResult};
use crate::geocode::{GeocodedPlace, REVERSE_GEOCODE_LIMIT, REVERSE_GEOCODE_PATH};

const WEATHER_PATH: &str = "/data/2.5/weather";
const USER_AGENT: &str = concat!("skylog/", env!("CARGO_PKG_VERSION"));

/// Thin client over the OpenWeatherMap weather and geocoding endpoints.
///
/// Every operation is a single GET. Nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    units: String,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
        })
    }

    /// Current weather for a city name.
    #[instrument(skip(self), level = "info")]
    pub async fn weather_by_city(&self, name: &str) -> ProviderResult<serde_json::Value> {
        self.get_json(
            WEATHER_PATH,
            &[
                ("q", name.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.clone()),
            ],
        )
        .await
    }

    /// Current weather for a coordinate pair.
    #[instrument(skip(self), level = "info")]
    pub async fn weather_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> ProviderResult<serde_json::Value> {
        self.get_json(
            WEATHER_PATH,
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.clone()),
            ],
        )
        .await
    }

    /// Places near a coordinate pair, best match first. May be empty.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> ProviderResult<Vec<GeocodedPlace>> {
        self.get_json(
            REVERSE_GEOCODE_PATH,
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("limit", REVERSE_GEOCODE_LIMIT.to_string()),
                ("appid", self.api_key.clone()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(e.into_network_error()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Unreachable(e.into_network_error()))?;

        if !status.is_success() {
            tracing::debug!("Provider returned status {} for {}", status, path);
            return Err(ProviderError::from_error_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!("Provider response parse error: {}", e);
            ProviderError::Unreachable(NetworkError::InvalidResponse(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ProviderConfig {
        ProviderConfig {
            api_key: "test-key".to_string(),
            base_url: format!("{}/", server.uri()),
            timeout_secs: 5,
            units: "metric".to_string(),
        }
    }

    #[tokio::test]
    async fn test_weather_by_city_sends_expected_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Kyiv"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Kyiv",
                "main": {"temp": 5}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
        let body = client.weather_by_city("Kyiv").await.unwrap();

        assert_eq!(body["name"], "Kyiv");
        assert_eq!(body["main"]["temp"], 5);
    }

    #[tokio::test]
    async fn test_city_name_is_url_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "San José & Co"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
        client.weather_by_city("San José & Co").await.unwrap();
    }

    #[tokio::test]
    async fn test_reverse_geocode_requests_single_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .and(query_param("lat", "50.45"))
            .and(query_param("lon", "30.52"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Kyiv", "country": "UA", "lat": 50.45, "lon": 30.52}
            ])))
            .mount(&mock_server)
            .await;

        let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
        let places = client.reverse_geocode(50.45, 30.52).await.unwrap();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Kyiv");
    }

    #[tokio::test]
    async fn test_rejected_carries_status_and_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&mock_server)
            .await;

        let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
        let result = client.weather_by_city("Atlantis").await;

        match result {
            Err(ProviderError::Rejected { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "city not found");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_unreachable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
        let result = client.weather_by_coordinates(1.0, 2.0).await;

        assert!(matches!(
            result,
            Err(ProviderError::Unreachable(NetworkError::InvalidResponse(_)))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let config = ProviderConfig {
            api_key: "k".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            units: "metric".to_string(),
        };
        let client = ProviderClient::new(&config).unwrap();
        let result = client.weather_by_city("Kyiv").await;

        assert!(matches!(result, Err(ProviderError::Unreachable(_))));
    }
}
