//! Reverse geocoding: convert coordinates to a human-readable place name.
//! Uses the OpenWeatherMap geocoding API, which shares the weather API key.

use serde::{Deserialize, Serialize};

pub(crate) const REVERSE_GEOCODE_PATH: &str = "/geo/1.0/reverse";

/// Only the best match is ever used.
pub(crate) const REVERSE_GEOCODE_LIMIT: u32 = 1;

/// One entry of a reverse geocoding answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Name of the first place in a reverse geocoding answer, if it has one.
///
/// Later entries are ignored even when the first one is nameless.
pub fn first_place_name(places: &[GeocodedPlace]) -> Option<&str> {
    places
        .first()
        .map(|p| p.name.trim())
        .filter(|name| !name.is_empty())
}
