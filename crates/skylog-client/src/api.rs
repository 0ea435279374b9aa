// crates/skylog-client/src/api.rs

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skylog_core::{ClientConfig, Coordinates, WeatherRecord};
use url::Url;

use crate::error::{ClientError, ClientResult};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error body returned by the Skylog server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the Skylog API.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    base_url: Url,
    client: Arc<Client>,
}

impl WeatherApiClient {
    pub fn new(api_url: &str) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(api_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", api_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("skylog-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
        })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(&config.api_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current weather for a city. Input is trimmed; blank input is refused
    /// without a request.
    pub async fn get_weather(&self, city: &str) -> ClientResult<serde_json::Value> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ClientError::EmptyCity);
        }

        tracing::debug!("Fetching weather for {}", city);
        self.get_json("weather", &[("city", city.to_string())]).await
    }

    pub async fn get_weather_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> ClientResult<serde_json::Value> {
        tracing::debug!("Fetching weather at {}, {}", coords.lat, coords.lon);
        self.get_json(
            "weather/coordinates",
            &[("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())],
        )
        .await
    }

    /// Recent lookups, newest first.
    pub async fn get_history(&self) -> ClientResult<Vec<WeatherRecord>> {
        tracing::debug!("Fetching weather history");
        self.get_json("weather/history", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = WeatherApiClient::new("http://localhost:3000/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/api/");
    }

    #[test]
    fn test_invalid_url() {
        let err = WeatherApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_get_weather_sends_trimmed_city() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("city", "New York"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "New York"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&mock_server.uri()).unwrap();
        let weather = client.get_weather("  New York ").await.unwrap();

        assert_eq!(weather["name"], "New York");
    }

    #[tokio::test]
    async fn test_blank_city_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&mock_server.uri()).unwrap();
        let err = client.get_weather("   ").await.unwrap_err();

        assert!(matches!(err, ClientError::EmptyCity));
    }

    #[tokio::test]
    async fn test_server_error_body_is_read() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "statusCode": 404,
                "message": "city not found"
            })))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&mock_server.uri()).unwrap();
        let err = client.get_weather("Atlantis").await.unwrap_err();

        match err {
            ClientError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "city not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_without_body_uses_reason() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/history"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&mock_server.uri()).unwrap();
        let err = client.get_history().await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[tokio::test]
    async fn test_coordinates_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/coordinates"))
            .and(query_param("lat", "50.45"))
            .and(query_param("lon", "30.52"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "Kyiv"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&mock_server.uri()).unwrap();
        let weather = client
            .get_weather_by_coordinates(Coordinates::new(50.45, 30.52))
            .await
            .unwrap();

        assert_eq!(weather["name"], "Kyiv");
    }

    #[tokio::test]
    async fn test_history_decode_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&mock_server.uri()).unwrap();
        let err = client.get_history().await.unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = WeatherApiClient::new("http://127.0.0.1:1").unwrap();
        let err = client.get_history().await.unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
    }
}
