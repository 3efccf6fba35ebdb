//! Weather domain for Stratus
//!
//! Open-Meteo forecast/air-quality/archive clients, geocoding, display
//! classification, moon phases, derived alerts, and the polling fetcher
//! that keeps a snapshot fresh for the view layer.

pub mod air;
pub mod alerts;
pub mod conditions;
pub mod fetcher;
pub mod geocode;
pub mod moon;
pub mod provider;
pub mod types;

pub use air::{AirQuality, AqiLevel, PollenRisk};
pub use alerts::{derive_alerts, Severity, WeatherAlert};
pub use conditions::ConditionBin;
pub use fetcher::{FetchPhase, FetchState, WeatherFetcher, DEFAULT_POLL_INTERVAL};
pub use geocode::{GeocodeMatch, Geocoder};
pub use moon::{phase_on, MoonPhase};
pub use provider::WeatherProvider;
pub use types::*;
