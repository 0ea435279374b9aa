//! Upstream weather provider client for Skylog.
//!
//! Wraps the OpenWeatherMap current-weather and reverse-geocoding endpoints.
//! Weather payloads are returned as opaque JSON documents.

pub mod error;
pub mod geocode;
pub mod provider;

pub use error::{ProviderError, ProviderResult};
pub use geocode::{first_place_name, GeocodedPlace};
pub use provider::ProviderClient;
