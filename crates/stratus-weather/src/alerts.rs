//! Advisory weather alerts derived from a snapshot.
//!
//! There is no upstream alert feed in the API family this dashboard uses, so
//! alerts are computed from the forecast itself. Ids are stable per event
//! and day so a dismissal keeps suppressing the same alert when it is
//! re-derived after a poll.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::conditions::ConditionBin;
use crate::types::{DailyEntry, WeatherSnapshot};

/// Alert severity, ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Extreme,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Extreme => "Extreme",
        }
    }
}

/// One advisory alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAlert {
    /// Stable identifier, e.g. "thunderstorm-2024-06-01"
    pub id: String,
    pub event: String,
    pub headline: String,
    pub description: String,
    pub severity: Severity,
    pub onset: NaiveDateTime,
    pub expires: NaiveDateTime,
}

/// How many leading days of the daily series produce alerts
const ALERT_HORIZON_DAYS: usize = 2;

/// Precipitation probability considered alert-worthy
const HEAVY_PRECIPITATION_THRESHOLD: u8 = 80;

/// UV index considered extreme
const EXTREME_UV_THRESHOLD: f64 = 11.0;

/// Derive advisory alerts for the next days of a snapshot, most severe first.
pub fn derive_alerts(snapshot: &WeatherSnapshot) -> Vec<WeatherAlert> {
    let mut alerts: Vec<WeatherAlert> = snapshot
        .daily
        .iter()
        .take(ALERT_HORIZON_DAYS)
        .flat_map(alerts_for_day)
        .collect();

    alerts.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.onset.cmp(&b.onset)));
    alerts
}

fn alerts_for_day(day: &DailyEntry) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();
    let onset = day.date.and_hms_opt(0, 0, 0).unwrap_or(day.sunrise);
    let expires = day
        .date
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(day.sunset);

    if ConditionBin::from_code(day.weather_code) == ConditionBin::Thunderstorm {
        alerts.push(WeatherAlert {
            id: format!("thunderstorm-{}", day.date),
            event: "Thunderstorm Warning".to_string(),
            headline: "Severe Thunderstorm Warning".to_string(),
            description: "Heavy rain and lightning expected in your area".to_string(),
            severity: Severity::Severe,
            onset,
            expires,
        });
    } else if day.precipitation_probability_max >= HEAVY_PRECIPITATION_THRESHOLD {
        alerts.push(WeatherAlert {
            id: format!("precipitation-{}", day.date),
            event: "Heavy Precipitation Watch".to_string(),
            headline: format!(
                "{}% chance of precipitation",
                day.precipitation_probability_max
            ),
            description: "Significant precipitation is likely; plan indoor alternatives"
                .to_string(),
            severity: Severity::Moderate,
            onset,
            expires,
        });
    }

    if day.uv_index_max >= EXTREME_UV_THRESHOLD {
        alerts.push(WeatherAlert {
            id: format!("uv-{}", day.date),
            event: "Extreme UV Advisory".to_string(),
            headline: format!("UV index reaching {:.0}", day.uv_index_max),
            description: "Limit sun exposure during midday hours".to_string(),
            severity: Severity::Moderate,
            onset,
            expires,
        });
    }

    alerts
}
