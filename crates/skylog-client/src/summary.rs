//! Display-oriented views over raw weather payloads.
//!
//! Payloads are opaque provider JSON; every field here is optional and a
//! missing or mistyped field just leaves it empty.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use skylog_core::WeatherRecord;

/// The headline fields of a weather payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSummary {
    pub name: Option<String>,
    pub country: Option<String>,
    /// Rounded to the nearest degree, halves rounded up.
    pub temperature: Option<i64>,
    /// `weather[0].main`, e.g. "Clouds".
    pub condition: Option<String>,
}

impl WeatherSummary {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            name: string_at(payload, &["name"]),
            country: string_at(payload, &["sys", "country"]),
            temperature: payload
                .pointer("/main/temp")
                .and_then(Value::as_f64)
                .map(round_half_up),
            condition: payload
                .pointer("/weather/0/main")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// One row of the history listing.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub city: String,
    pub country: Option<String>,
    pub temperature: Option<i64>,
    pub condition: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// "Kyiv, UA", or just the city when the country is unknown.
    pub fn title(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.city, country),
            None => self.city.clone(),
        }
    }
}

impl From<&WeatherRecord> for HistoryEntry {
    fn from(record: &WeatherRecord) -> Self {
        let summary = WeatherSummary::from_payload(&record.weather_data);
        Self {
            city: record.city.clone(),
            country: summary.country,
            temperature: summary.temperature,
            condition: summary.condition,
            created_at: record.created_at,
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())?;
        if let Some(temp) = self.temperature {
            write!(f, " {}°", temp)?;
        }
        if let Some(condition) = &self.condition {
            write!(f, " {}", condition)?;
        }
        Ok(())
    }
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |v, key| v.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
