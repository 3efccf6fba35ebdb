//! Open-Meteo API clients: forecast, air quality, and historical archive.

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::air::AirQuality;
use crate::types::{
    CurrentConditions, DailyEntry, GeoPoint, HistoricalDay, HourlyEntry, LocationQuery,
    TemperatureUnit, WeatherError, WeatherSnapshot,
};

const FORECAST_URL: &str = "https://api.open-meteo.com";
const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com";
const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
weather_code,wind_speed_10m,wind_direction_10m,dew_point_2m,pressure_msl";
const HOURLY_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,visibility,precipitation_probability,dew_point_2m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset,\
uv_index_max,precipitation_sum,precipitation_probability_max";
const AIR_FIELDS: &str =
    "us_aqi,pm2_5,pm10,nitrogen_dioxide,ozone,birch_pollen,grass_pollen,ragweed_pollen";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<RawCurrent>,
    daily: Option<RawDaily>,
    hourly: Option<RawHourly>,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    weather_code: i32,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    dew_point_2m: f64,
    pressure_msl: f64,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    time: Vec<String>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
    uv_index_max: Vec<f64>,
    precipitation_sum: Vec<f64>,
    precipitation_probability_max: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    relative_humidity_2m: Vec<f64>,
    visibility: Vec<f64>,
    precipitation_probability: Vec<f64>,
    dew_point_2m: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: Option<RawAirCurrent>,
}

#[derive(Debug, Deserialize)]
struct RawAirCurrent {
    us_aqi: f64,
    pm2_5: f64,
    pm10: f64,
    nitrogen_dioxide: f64,
    ozone: f64,
    #[serde(default)]
    birch_pollen: Option<f64>,
    #[serde(default)]
    grass_pollen: Option<f64>,
    #[serde(default)]
    ragweed_pollen: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<RawArchiveDaily>,
}

#[derive(Debug, Deserialize)]
struct RawArchiveDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_sum: Vec<f64>,
}

/// HTTP client for the Open-Meteo service family.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    forecast_base: String,
    air_base: String,
    archive_base: String,
}

impl WeatherProvider {
    pub fn new() -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            forecast_base: FORECAST_URL.to_string(),
            air_base: AIR_QUALITY_URL.to_string(),
            archive_base: ARCHIVE_URL.to_string(),
        })
    }

    /// Point the client at alternate hosts (used by integration tests).
    pub fn with_base_urls(
        forecast_base: &str,
        air_base: &str,
        archive_base: &str,
    ) -> Result<Self, WeatherError> {
        let mut provider = Self::new()?;
        provider.forecast_base = forecast_base.trim_end_matches('/').to_string();
        provider.air_base = air_base.trim_end_matches('/').to_string();
        provider.archive_base = archive_base.trim_end_matches('/').to_string();
        Ok(provider)
    }

    /// Fetch a full snapshot (current, hourly, daily) for one query.
    pub async fn fetch_forecast(
        &self,
        query: &LocationQuery,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current={}&hourly={}&daily={}\
&temperature_unit={}&wind_speed_unit=kmh&timezone=auto",
            self.forecast_base,
            query.point.latitude,
            query.point.longitude,
            CURRENT_FIELDS,
            HOURLY_FIELDS,
            DAILY_FIELDS,
            query.unit.api_value(),
        );

        let body: ForecastResponse = self.get_json(&url).await?;

        // All three top-level sections must be present; a partial payload is
        // reported as malformed rather than silently rendered.
        let current = body
            .current
            .ok_or_else(|| WeatherError::MalformedPayload("missing current section".into()))?;
        let daily = body
            .daily
            .ok_or_else(|| WeatherError::MalformedPayload("missing daily section".into()))?;
        let hourly = body
            .hourly
            .ok_or_else(|| WeatherError::MalformedPayload("missing hourly section".into()))?;

        Ok(WeatherSnapshot {
            current: convert_current(current)?,
            daily: convert_daily(daily)?,
            hourly: convert_hourly(hourly)?,
            fetched_at: Utc::now(),
        })
    }

    /// Fetch current air quality and pollen readings.
    pub async fn fetch_air_quality(&self, point: &GeoPoint) -> Result<AirQuality, WeatherError> {
        let url = format!(
            "{}/v1/air-quality?latitude={}&longitude={}&current={}&timezone=auto",
            self.air_base, point.latitude, point.longitude, AIR_FIELDS,
        );

        let body: AirQualityResponse = self.get_json(&url).await?;
        let current = body
            .current
            .ok_or_else(|| WeatherError::MalformedPayload("missing current section".into()))?;

        Ok(AirQuality {
            aqi: current.us_aqi.round().max(0.0) as u16,
            pm2_5: current.pm2_5,
            pm10: current.pm10,
            nitrogen_dioxide: current.nitrogen_dioxide,
            ozone: current.ozone,
            birch_pollen: current.birch_pollen.unwrap_or(0.0),
            grass_pollen: current.grass_pollen.unwrap_or(0.0),
            ragweed_pollen: current.ragweed_pollen.unwrap_or(0.0),
        })
    }

    /// Fetch the trailing `days` of daily history ending yesterday.
    pub async fn fetch_history(
        &self,
        point: &GeoPoint,
        unit: TemperatureUnit,
        days: u32,
    ) -> Result<Vec<HistoricalDay>, WeatherError> {
        let end = Utc::now().date_naive() - ChronoDuration::days(1);
        let start = end - ChronoDuration::days(i64::from(days.saturating_sub(1)));

        let url = format!(
            "{}/v1/archive?latitude={}&longitude={}&start_date={}&end_date={}\
&daily=temperature_2m_max,temperature_2m_min,precipitation_sum&temperature_unit={}&timezone=auto",
            self.archive_base,
            point.latitude,
            point.longitude,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            unit.api_value(),
        );

        let body: ArchiveResponse = self.get_json(&url).await?;
        let daily = body
            .daily
            .ok_or_else(|| WeatherError::MalformedPayload("missing daily section".into()))?;

        let mut out = Vec::with_capacity(daily.time.len());
        for (i, date) in daily.time.iter().enumerate() {
            let (Some(max), Some(min), Some(precipitation)) = (
                daily.temperature_2m_max.get(i),
                daily.temperature_2m_min.get(i),
                daily.precipitation_sum.get(i),
            ) else {
                break;
            };
            out.push(HistoricalDay {
                date: parse_date(date)?,
                temperature_max: *max,
                temperature_min: *min,
                precipitation_sum: *precipitation,
            });
        }
        Ok(out)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned {}: {}", status, message);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::MalformedPayload(e.to_string()))
    }
}

fn convert_current(raw: RawCurrent) -> Result<CurrentConditions, WeatherError> {
    Ok(CurrentConditions {
        time: parse_datetime(&raw.time)?,
        temperature: raw.temperature_2m,
        apparent_temperature: raw.apparent_temperature,
        relative_humidity: raw.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
        weather_code: raw.weather_code,
        wind_speed: raw.wind_speed_10m,
        wind_direction: raw.wind_direction_10m,
        dew_point: raw.dew_point_2m,
        pressure_msl: raw.pressure_msl,
    })
}

fn convert_daily(raw: RawDaily) -> Result<Vec<DailyEntry>, WeatherError> {
    let mut out = Vec::with_capacity(raw.time.len());
    for (i, date) in raw.time.iter().enumerate() {
        // Columns are zipped positionally; a short column ends the series.
        let (
            Some(code),
            Some(max),
            Some(min),
            Some(sunrise),
            Some(sunset),
            Some(uv),
            Some(precipitation),
            Some(precipitation_probability),
        ) = (
            raw.weather_code.get(i),
            raw.temperature_2m_max.get(i),
            raw.temperature_2m_min.get(i),
            raw.sunrise.get(i),
            raw.sunset.get(i),
            raw.uv_index_max.get(i),
            raw.precipitation_sum.get(i),
            raw.precipitation_probability_max.get(i),
        )
        else {
            break;
        };

        out.push(DailyEntry {
            date: parse_date(date)?,
            weather_code: *code,
            temperature_max: *max,
            temperature_min: *min,
            sunrise: parse_datetime(sunrise)?,
            sunset: parse_datetime(sunset)?,
            uv_index_max: *uv,
            precipitation_sum: *precipitation,
            precipitation_probability_max: precipitation_probability.round().clamp(0.0, 100.0)
                as u8,
        });
    }
    Ok(out)
}

fn convert_hourly(raw: RawHourly) -> Result<Vec<HourlyEntry>, WeatherError> {
    let mut out = Vec::with_capacity(raw.time.len());
    for (i, time) in raw.time.iter().enumerate() {
        let (Some(temperature), Some(humidity), Some(visibility), Some(probability), Some(dew)) = (
            raw.temperature_2m.get(i),
            raw.relative_humidity_2m.get(i),
            raw.visibility.get(i),
            raw.precipitation_probability.get(i),
            raw.dew_point_2m.get(i),
        ) else {
            break;
        };

        out.push(HourlyEntry {
            time: parse_datetime(time)?,
            temperature: *temperature,
            relative_humidity: humidity.round().clamp(0.0, 100.0) as u8,
            visibility: *visibility,
            precipitation_probability: probability.round().clamp(0.0, 100.0) as u8,
            dew_point: *dew,
        });
    }
    Ok(out)
}

/// Parse the API's `YYYY-MM-DD` date strings.
fn parse_date(s: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| WeatherError::MalformedPayload(format!("bad date '{}': {}", s, e)))
}

/// Parse the API's ISO-8601 local timestamps (minute precision, with or
/// without seconds).
fn parse_datetime(s: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| WeatherError::MalformedPayload(format!("bad timestamp '{}': {}", s, e)))
}
