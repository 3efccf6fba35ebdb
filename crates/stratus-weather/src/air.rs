//! Air quality and pollen readings with display classification.

use serde::{Deserialize, Serialize};

/// Current air quality and pollen readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQuality {
    /// US AQI
    pub aqi: u16,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nitrogen_dioxide: f64,
    pub ozone: f64,
    /// Pollen concentrations in grains/m³
    pub birch_pollen: f64,
    pub grass_pollen: f64,
    pub ragweed_pollen: f64,
}

impl AirQuality {
    pub fn aqi_level(&self) -> AqiLevel {
        AqiLevel::from_aqi(self.aqi)
    }

    /// Worst of the tree/grass/weed pollen levels
    pub fn pollen_risk(&self) -> PollenRisk {
        [self.birch_pollen, self.grass_pollen, self.ragweed_pollen]
            .into_iter()
            .map(PollenRisk::from_level)
            .max()
            .unwrap_or(PollenRisk::Low)
    }
}

/// US AQI classification bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiLevel {
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthySensitive,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Good => "Air quality is satisfactory",
            Self::Moderate => "Sensitive groups may be affected",
            Self::UnhealthySensitive => "Consider limiting outdoor activity",
            Self::Unhealthy => "Reduce outdoor activities",
            Self::VeryUnhealthy => "Avoid outdoor activities",
            Self::Hazardous => "Stay indoors",
        }
    }
}

/// Pollen risk bands shared by all pollen kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollenRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl PollenRisk {
    pub fn from_level(level: f64) -> Self {
        if level < 30.0 {
            Self::Low
        } else if level < 60.0 {
            Self::Moderate
        } else if level < 90.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    pub fn allergy_tip(&self) -> &'static str {
        match self {
            Self::Low => "Low risk. Most people can enjoy outdoor activities without concern.",
            Self::Moderate => {
                "Sensitive individuals may experience mild symptoms. Consider wearing masks outdoors."
            }
            Self::High => "High risk for allergies. Wear protective masks and limit time outdoors.",
            Self::VeryHigh => "Very high risk. Stay indoors and use air filtration systems.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(aqi: u16) -> AirQuality {
        AirQuality {
            aqi,
            pm2_5: 5.0,
            pm10: 10.0,
            nitrogen_dioxide: 8.0,
            ozone: 40.0,
            birch_pollen: 0.0,
            grass_pollen: 0.0,
            ragweed_pollen: 0.0,
        }
    }

    #[test]
    fn test_aqi_bands() {
        assert_eq!(AqiLevel::from_aqi(0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_aqi(50), AqiLevel::Good);
        assert_eq!(AqiLevel::from_aqi(51), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_aqi(150), AqiLevel::UnhealthySensitive);
        assert_eq!(AqiLevel::from_aqi(200), AqiLevel::Unhealthy);
        assert_eq!(AqiLevel::from_aqi(300), AqiLevel::VeryUnhealthy);
        assert_eq!(AqiLevel::from_aqi(301), AqiLevel::Hazardous);
    }

    #[test]
    fn test_aqi_level_on_reading() {
        assert_eq!(reading(42).aqi_level(), AqiLevel::Good);
        assert_eq!(reading(42).aqi_level().label(), "Good");
    }

    #[test]
    fn test_pollen_bands() {
        assert_eq!(PollenRisk::from_level(0.0), PollenRisk::Low);
        assert_eq!(PollenRisk::from_level(29.9), PollenRisk::Low);
        assert_eq!(PollenRisk::from_level(30.0), PollenRisk::Moderate);
        assert_eq!(PollenRisk::from_level(60.0), PollenRisk::High);
        assert_eq!(PollenRisk::from_level(90.0), PollenRisk::VeryHigh);
    }

    #[test]
    fn test_overall_pollen_risk_is_worst() {
        let mut r = reading(10);
        r.birch_pollen = 10.0;
        r.grass_pollen = 75.0;
        r.ragweed_pollen = 40.0;
        assert_eq!(r.pollen_risk(), PollenRisk::High);
    }
}
