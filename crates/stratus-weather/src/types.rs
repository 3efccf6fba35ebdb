use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value expected by the Open-Meteo `temperature_unit` parameter
    pub fn api_value(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    /// Display suffix, e.g. "°C"
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

/// A pair of validated coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() {
            return Err(WeatherError::InvalidCoordinate(latitude));
        }
        if !longitude.is_finite() {
            return Err(WeatherError::InvalidCoordinate(longitude));
        }
        Ok(Self { latitude, longitude })
    }
}

/// The (coordinates, unit) key identifying what to fetch.
///
/// Two queries are equivalent iff all three fields match; the unit is part
/// of the identity because the remote service encodes it server-side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationQuery {
    pub point: GeoPoint,
    pub unit: TemperatureUnit,
}

impl LocationQuery {
    pub fn new(point: GeoPoint, unit: TemperatureUnit) -> Self {
        Self { point, unit }
    }
}

/// Current conditions at the time of the fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub relative_humidity: u8,
    pub weather_code: i32,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub dew_point: f64,
    pub pressure_msl: f64,
}

/// One day of the daily series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
    pub uv_index_max: f64,
    pub precipitation_sum: f64,
    pub precipitation_probability_max: u8,
}

/// One hour of the hourly series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub relative_humidity: u8,
    pub visibility: f64,
    pub precipitation_probability: u8,
    pub dew_point: f64,
}

/// The result of one successful fetch.
///
/// Immutable once received; replaced wholesale on each successful poll,
/// never partially merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub daily: Vec<DailyEntry>,
    pub hourly: Vec<HourlyEntry>,
    pub fetched_at: DateTime<Utc>,
}

/// One day of the historical (archive) series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalDay {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub precipitation_sum: f64,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed weather data: {0}")]
    MalformedPayload(String),
    #[error("No match for location: {0}")]
    NoMatch(String),
    #[error("Coordinate is not a finite number: {0}")]
    InvalidCoordinate(f64),
}

/// Convert wind direction in degrees to an 8-point compass label.
pub fn compass_direction(degrees: f64) -> &'static str {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = ((degrees / 45.0).round() as usize) % 8;
    DIRECTIONS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(40.7128, -74.0060).is_ok());
    }

    #[test]
    fn test_query_identity_includes_unit() {
        let point = GeoPoint::new(40.7128, -74.0060).unwrap();
        let celsius = LocationQuery::new(point, TemperatureUnit::Celsius);
        let fahrenheit = LocationQuery::new(point, TemperatureUnit::Fahrenheit);
        assert_ne!(celsius, fahrenheit);
        assert_eq!(celsius, LocationQuery::new(point, TemperatureUnit::Celsius));
    }

    #[test]
    fn test_query_identity_differs_by_coordinates() {
        let new_york = GeoPoint::new(40.7128, -74.0060).unwrap();
        let seattle = GeoPoint::new(47.6062, -122.3321).unwrap();
        assert_ne!(
            LocationQuery::new(new_york, TemperatureUnit::Celsius),
            LocationQuery::new(seattle, TemperatureUnit::Celsius)
        );
    }

    #[test]
    fn test_unit_api_value() {
        assert_eq!(TemperatureUnit::Celsius.api_value(), "celsius");
        assert_eq!(TemperatureUnit::Fahrenheit.api_value(), "fahrenheit");
    }

    #[test]
    fn test_compass_direction() {
        assert_eq!(compass_direction(0.0), "N");
        assert_eq!(compass_direction(90.0), "E");
        assert_eq!(compass_direction(180.0), "S");
        assert_eq!(compass_direction(270.0), "W");
        assert_eq!(compass_direction(359.0), "N");
        assert_eq!(compass_direction(44.0), "NE");
    }
}
