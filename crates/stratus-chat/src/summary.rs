//! Prompt assembly for the one-shot weather summary.

use stratus_weather::conditions::ConditionBin;
use stratus_weather::types::{TemperatureUnit, WeatherSnapshot};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a weather summarization assistant. \
Provide a concise, natural, and engaging summary of the current weather conditions. \
Include practical recommendations for outdoor activities or what to wear. \
Keep the response to 2-3 sentences maximum. \
Use emojis to make it engaging but not overwhelming.";

/// Render the snapshot into the fact block the summarizer is prompted with.
pub fn weather_context(
    snapshot: &WeatherSnapshot,
    location_name: &str,
    unit: TemperatureUnit,
) -> String {
    let suffix = unit.suffix();
    let current = &snapshot.current;

    let mut lines = vec![
        format!("Current Weather at {}:", location_name),
        format!("- Temperature: {}{}", current.temperature, suffix),
        format!(
            "- Condition: {}",
            ConditionBin::from_code(current.weather_code).label()
        ),
        format!("- Feels like: {}{}", current.apparent_temperature, suffix),
        format!("- Humidity: {}%", current.relative_humidity),
        format!("- Wind Speed: {} km/h", current.wind_speed),
        format!("- Dew Point: {}{}", current.dew_point, suffix),
        format!("- Pressure: {} hPa", current.pressure_msl),
    ];

    if let Some(today) = snapshot.daily.first() {
        lines.push(format!("- UV Index: {:.0}", today.uv_index_max));
        lines.push(format!("- Sunrise: {}", today.sunrise.format("%H:%M")));
        lines.push(format!("- Sunset: {}", today.sunset.format("%H:%M")));
        lines.push(format!("- Today's High: {}{}", today.temperature_max, suffix));
        lines.push(format!("- Today's Low: {}{}", today.temperature_min, suffix));
        lines.push(format!(
            "- Precipitation Probability: {}%",
            today.precipitation_probability_max
        ));
        lines.push(format!("- Precipitation: {} mm", today.precipitation_sum));
    }

    lines.join("\n")
}
