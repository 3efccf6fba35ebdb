//! Weather-code classification for display.
//!
//! WMO weather codes are bucketed into eight ordered bins by ascending code
//! threshold; the last bin is the catch-all for codes outside the table.
//! Each bin maps deterministically to a display label, an icon token, and
//! the gradient/background tokens the view layer styles cards with.

use serde::{Deserialize, Serialize};

/// Display bins for WMO weather codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionBin {
    #[default]
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl ConditionBin {
    /// Classify a WMO weather code. Total over all integers; out-of-table
    /// codes land in the catch-all bin.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            4..=49 => Self::Fog,
            50..=59 => Self::Drizzle,
            60..=69 => Self::Rain,
            70..=79 => Self::Snow,
            80..=99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Human-readable condition label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Fog => "Foggy",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Clear",
        }
    }

    /// Icon token for the presentation layer
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Fog => "cloud_fog",
            Self::Drizzle => "cloud_drizzle",
            Self::Rain => "cloud_rain",
            Self::Snow => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
            Self::Unknown => "sun",
        }
    }
}

/// Card gradient token for a weather code.
pub fn gradient(code: i32) -> &'static str {
    match ConditionBin::from_code(code) {
        ConditionBin::Clear => "from-yellow-400/20 to-blue-400/20",
        ConditionBin::PartlyCloudy => "from-blue-300/20 to-blue-200/20",
        ConditionBin::Fog => "from-gray-400/20 to-gray-300/20",
        ConditionBin::Drizzle => "from-blue-500/20 to-blue-400/20",
        ConditionBin::Rain => "from-blue-600/20 to-blue-500/20",
        ConditionBin::Snow => "from-blue-300/20 to-white/20",
        ConditionBin::Thunderstorm | ConditionBin::Unknown => {
            "from-purple-500/20 to-purple-400/20"
        }
    }
}

/// Page background token for a weather code.
pub fn background(code: i32) -> &'static str {
    match ConditionBin::from_code(code) {
        ConditionBin::Clear => "bg-yellow-50/5",
        ConditionBin::PartlyCloudy => "bg-blue-50/5",
        ConditionBin::Fog => "bg-gray-50/5",
        ConditionBin::Drizzle => "bg-blue-100/5",
        ConditionBin::Rain => "bg-blue-200/5",
        ConditionBin::Snow => "bg-blue-50/5",
        ConditionBin::Thunderstorm | ConditionBin::Unknown => "bg-purple-100/5",
    }
}
