//! Geocoding: free-text search and best-effort reverse lookup.
//!
//! Search resolves a place name to coordinates via the Open-Meteo geocoding
//! API. Reverse lookup converts coordinates to a place name and degrades to
//! `None` on any failure; it must never block the main flow.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{GeoPoint, WeatherError};

const SEARCH_URL: &str = "https://geocoding-api.open-meteo.com";
const REVERSE_URL: &str = "https://api.bigdatacloud.net";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Best match for a free-text location search
#[derive(Debug, Clone)]
pub struct GeocodeMatch {
    pub point: GeoPoint,
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
}

impl GeocodeMatch {
    /// Human-readable label, e.g. "Paris, Île-de-France, France"
    pub fn display_name(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(admin1) = self.admin1.as_ref().filter(|s| !s.is_empty()) {
            parts.push(admin1.clone());
        }
        if let Some(country) = self.country.as_ref().filter(|s| !s.is_empty()) {
            parts.push(country.clone());
        }
        parts.join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    city: Option<String>,
    locality: Option<String>,
    #[serde(rename = "principalSubdivision")]
    principal_subdivision: Option<String>,
}

/// Geocoding client for search and reverse lookup.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    search_base: String,
    reverse_base: String,
}

impl Geocoder {
    pub fn new() -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            search_base: SEARCH_URL.to_string(),
            reverse_base: REVERSE_URL.to_string(),
        })
    }

    /// Point the client at alternate hosts (used by integration tests).
    pub fn with_base_urls(search_base: &str, reverse_base: &str) -> Result<Self, WeatherError> {
        let mut geocoder = Self::new()?;
        geocoder.search_base = search_base.trim_end_matches('/').to_string();
        geocoder.reverse_base = reverse_base.trim_end_matches('/').to_string();
        Ok(geocoder)
    }

    /// Resolve a free-text name to its best match.
    ///
    /// Empty input and zero-result responses are reported as `NoMatch`
    /// before/without surfacing a transport error.
    pub async fn search(&self, name: &str) -> Result<GeocodeMatch, WeatherError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::NoMatch(name.to_string()));
        }

        let url = format!(
            "{}/v1/search?name={}&count=1&language=en&format=json",
            self.search_base,
            urlencoding::encode(trimmed)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::MalformedPayload(e.to_string()))?;

        let result = body
            .results
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| WeatherError::NoMatch(trimmed.to_string()))?;

        let point = GeoPoint::new(result.latitude, result.longitude)?;
        tracing::info!("Geocoded '{}' to {}, {}", trimmed, point.latitude, point.longitude);

        Ok(GeocodeMatch {
            point,
            name: result.name,
            admin1: result.admin1,
            country: result.country,
        })
    }

    /// Reverse geocode coordinates to a place name.
    ///
    /// Returns `None` on failure or timeout; the caller falls back to a
    /// placeholder label.
    pub async fn reverse(&self, point: &GeoPoint) -> Option<String> {
        let url = format!(
            "{}/data/reverse-geocode-client?latitude={}&longitude={}&localityLanguage=en",
            self.reverse_base, point.latitude, point.longitude
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: ReverseResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let name = body
            .city
            .filter(|s| !s.is_empty())
            .or(body.locality.filter(|s| !s.is_empty()))
            .or(body.principal_subdivision.filter(|s| !s.is_empty()));

        if let Some(ref n) = name {
            tracing::info!("Reverse geocoded to: {}", n);
        }
        name
    }
}
