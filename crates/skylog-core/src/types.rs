use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// City label used when reverse geocoding yields no place name.
pub const UNKNOWN_CITY: &str = "Unknown";

/// A persisted snapshot of one successful weather lookup.
///
/// `weather_data` is the provider payload exactly as received; nothing in the
/// write path inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub city: String,
    pub weather_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl WeatherRecord {
    pub fn new(city: impl Into<String>, weather_data: serde_json::Value) -> Self {
        Self {
            city: city.into(),
            weather_data,
            created_at: Utc::now(),
        }
    }
}

/// Geographic position as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// What the caller asked to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl From<Coordinates> for LocationQuery {
    fn from(c: Coordinates) -> Self {
        LocationQuery::Coordinates(c)
    }
}
