mod dashboard;
mod error_mapping;

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;

use dashboard::Dashboard;
use stratus_core::Config;
use stratus_weather::conditions::ConditionBin;
use stratus_weather::fetcher::{FetchPhase, FetchState};
use stratus_weather::moon::phase_on;
use stratus_weather::types::{compass_direction, WeatherSnapshot};

/// How long the first fetch may take before startup gives up
const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    stratus_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let mut dashboard = Dashboard::new(&config)?;
    let mut states = dashboard.observe();

    println!("Stratus — Weather Dashboard");
    println!("Location: {}\n", dashboard.location_name());

    let state = wait_for_terminal(&mut states).await?;

    if let Some(error) = &state.error {
        tracing::warn!("Fetch reported an error: {}", error);
        println!("Weather data is unavailable: {}", error);
        if state.stale {
            println!("Showing the last known conditions instead.\n");
        }
    }

    let Some(snapshot) = state.snapshot.clone() else {
        println!("No weather data to show. Check your connection and try again.");
        return Ok(());
    };

    print_snapshot(&dashboard, &snapshot);

    match dashboard.air_quality().await {
        Ok(air) => {
            let level = air.aqi_level();
            println!("Air quality: AQI {} ({}) — {}", air.aqi, level.label(), level.description());
            println!(
                "Pollen: {} — {}\n",
                air.pollen_risk().label(),
                air.pollen_risk().allergy_tip()
            );
        }
        Err(e) => {
            println!("{}\n", error_mapping::weather_error(e).user_message());
        }
    }

    match dashboard.history().await {
        Ok(history) if !history.is_empty() => {
            println!("Past week:");
            for day in &history {
                println!(
                    "  {}  {:>5.1}{} / {:>5.1}{}  {:>4.1} mm",
                    day.date,
                    day.temperature_max,
                    dashboard.unit().suffix(),
                    day.temperature_min,
                    dashboard.unit().suffix(),
                    day.precipitation_sum,
                );
            }
            println!();
        }
        Ok(_) => {}
        Err(e) => {
            println!("{}\n", error_mapping::weather_error(e).user_message());
        }
    }

    let moon = phase_on(Utc::now().date_naive());
    println!("Moon: {} {} ({}% illuminated)\n", moon.emoji, moon.name, moon.illumination);

    match dashboard.summarize(&snapshot).await {
        Ok(summary) => println!("Summary: {}", summary),
        Err(e) => println!("{}", error_mapping::chat_error(e).user_message()),
    }

    Ok(())
}

/// Wait for the first settled fetch state (success or failure).
async fn wait_for_terminal(states: &mut watch::Receiver<FetchState>) -> Result<FetchState> {
    let settled = tokio::time::timeout(STARTUP_TIMEOUT, async {
        loop {
            {
                let state = states.borrow();
                if matches!(state.phase, FetchPhase::Ready | FetchPhase::Failed) {
                    return Ok(state.clone());
                }
            }
            if states.changed().await.is_err() {
                anyhow::bail!("fetcher stopped before producing a result");
            }
        }
    })
    .await;

    match settled {
        Ok(state) => state,
        Err(_) => anyhow::bail!("timed out waiting for the first weather fetch"),
    }
}

fn print_snapshot(dashboard: &Dashboard, snapshot: &WeatherSnapshot) {
    let unit = dashboard.unit();
    let current = &snapshot.current;
    let bin = ConditionBin::from_code(current.weather_code);

    println!(
        "Now: {}{} ({}), feels like {}{}",
        current.temperature,
        unit.suffix(),
        bin.label(),
        current.apparent_temperature,
        unit.suffix(),
    );
    println!(
        "Humidity {}% · Wind {} km/h {} · Pressure {} hPa · Dew point {}{}\n",
        current.relative_humidity,
        current.wind_speed,
        compass_direction(current.wind_direction),
        current.pressure_msl,
        current.dew_point,
        unit.suffix(),
    );

    for alert in dashboard.visible_alerts(snapshot) {
        println!(
            "⚠ [{}] {} — {}",
            alert.severity.label(),
            alert.headline,
            alert.description
        );
    }

    if !snapshot.daily.is_empty() {
        println!("Forecast:");
        for day in &snapshot.daily {
            println!(
                "  {}  {:<14} {:>5.1}{} / {:>5.1}{}  {:>3}%",
                day.date,
                ConditionBin::from_code(day.weather_code).label(),
                day.temperature_max,
                unit.suffix(),
                day.temperature_min,
                unit.suffix(),
                day.precipitation_probability_max,
            );
        }
        println!();
    }
}
