//! Single-owner dashboard state.
//!
//! Owns the preference store, the fetcher handle, and the chat session, and
//! serializes every mutation through one logical owner. Components receive
//! what they need by injection; nothing reaches into storage ambiently.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;

use stratus_chat::{ChatError, ChatMessage, ChatSession, CompletionClient};
use stratus_core::Config;
use stratus_store::{FavoriteLocation, PrefStore};
use stratus_weather::air::AirQuality;
use stratus_weather::alerts::{derive_alerts, WeatherAlert};
use stratus_weather::fetcher::{FetchState, WeatherFetcher};
use stratus_weather::geocode::Geocoder;
use stratus_weather::provider::WeatherProvider;
use stratus_weather::types::{
    GeoPoint, HistoricalDay, LocationQuery, TemperatureUnit, WeatherError, WeatherSnapshot,
};

/// How many trailing days the history panel shows
const HISTORY_DAYS: u32 = 7;

fn unit_from_config(unit: stratus_core::TemperatureUnit) -> TemperatureUnit {
    match unit {
        stratus_core::TemperatureUnit::Celsius => TemperatureUnit::Celsius,
        stratus_core::TemperatureUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
    }
}

pub struct Dashboard {
    store: Arc<PrefStore>,
    provider: WeatherProvider,
    geocoder: Geocoder,
    fetcher: WeatherFetcher,
    session: ChatSession,
    unit: TemperatureUnit,
    point: GeoPoint,
    location_name: String,
}

impl Dashboard {
    /// Wire the dashboard up and restore the last viewed location. The
    /// restored query is issued immediately; no permission prompt or
    /// geolocation lookup is involved.
    pub fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(PrefStore::open(config.config_dir.join("prefs.json")));
        let provider = WeatherProvider::new()?;
        let geocoder = Geocoder::new()?;

        let poll_interval =
            Duration::from_secs(u64::from(config.weather.refresh_minutes) * 60);
        let fetcher =
            WeatherFetcher::spawn(provider.clone(), store.clone(), poll_interval);

        let client = CompletionClient::new(
            config.chat.api_key.clone(),
            config.chat.model.clone(),
            config.chat.max_tokens,
            config.chat.temperature,
        )?;
        let session = ChatSession::new(client);

        let unit = unit_from_config(config.weather.temperature_unit);
        let saved = store.last_location();
        let point = GeoPoint::new(saved.latitude, saved.longitude)?;
        let location_name = saved.name;

        let dashboard = Self {
            store,
            provider,
            geocoder,
            fetcher,
            session,
            unit,
            point,
            location_name,
        };
        dashboard.requery();
        Ok(dashboard)
    }

    fn requery(&self) {
        self.fetcher.set_query(
            LocationQuery::new(self.point, self.unit),
            Some(self.location_name.clone()),
        );
    }

    /// Watch fetch state changes.
    pub fn observe(&self) -> watch::Receiver<FetchState> {
        self.fetcher.observe()
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Resolve a free-text search and switch to the match.
    pub async fn search(&mut self, query: &str) -> Result<String, WeatherError> {
        let hit = self.geocoder.search(query).await?;
        self.point = hit.point;
        self.location_name = hit.display_name();
        self.requery();
        Ok(self.location_name.clone())
    }

    /// Jump to explicit coordinates, resolving a display name best-effort.
    /// A failed reverse lookup degrades to a placeholder, never an error.
    pub async fn locate(&mut self, point: GeoPoint) -> String {
        let name = self
            .geocoder
            .reverse(&point)
            .await
            .unwrap_or_else(|| "Unknown Location".to_string());
        self.point = point;
        self.location_name = name.clone();
        self.requery();
        name
    }

    /// Switch temperature units; the current location is re-fetched since
    /// the unit is part of the query identity.
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        if self.unit == unit {
            return;
        }
        self.unit = unit;
        self.requery();
    }

    pub fn dark_mode(&self) -> bool {
        self.store.dark_mode()
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), stratus_store::StoreError> {
        self.store.set_dark_mode(enabled)
    }

    pub fn favorites(&self) -> Vec<FavoriteLocation> {
        self.store.favorites()
    }

    /// Geocode a name and save it as a favorite.
    pub async fn add_favorite(&self, name: &str) -> Result<FavoriteLocation, WeatherError> {
        let hit = self.geocoder.search(name).await?;
        let favorite = FavoriteLocation {
            name: hit.display_name(),
            latitude: hit.point.latitude,
            longitude: hit.point.longitude,
        };
        if let Err(e) = self.store.add_favorite(favorite.clone()) {
            tracing::warn!("Failed to save favorite: {}", e);
        }
        Ok(favorite)
    }

    pub fn remove_favorite(&self, latitude: f64, longitude: f64) {
        if let Err(e) = self.store.remove_favorite(latitude, longitude) {
            tracing::warn!("Failed to remove favorite: {}", e);
        }
    }

    /// Switch to a saved favorite.
    pub fn select_favorite(&mut self, favorite: &FavoriteLocation) -> Result<(), WeatherError> {
        self.point = GeoPoint::new(favorite.latitude, favorite.longitude)?;
        self.location_name = favorite.name.clone();
        self.requery();
        Ok(())
    }

    /// Alerts for the snapshot minus those the user dismissed.
    pub fn visible_alerts(&self, snapshot: &WeatherSnapshot) -> Vec<WeatherAlert> {
        derive_alerts(snapshot)
            .into_iter()
            .filter(|alert| !self.store.is_dismissed(&alert.id))
            .collect()
    }

    pub fn dismiss_alert(&self, alert_id: &str) {
        if let Err(e) = self.store.dismiss_alert(alert_id) {
            tracing::warn!("Failed to persist dismissal: {}", e);
        }
    }

    pub async fn air_quality(&self) -> Result<AirQuality, WeatherError> {
        self.provider.fetch_air_quality(&self.point).await
    }

    pub async fn history(&self) -> Result<Vec<HistoricalDay>, WeatherError> {
        self.provider
            .fetch_history(&self.point, self.unit, HISTORY_DAYS)
            .await
    }

    /// Send a chat message through the gated session.
    pub async fn chat(&mut self, text: &str) -> Result<ChatMessage, ChatError> {
        self.session.send(text, Utc::now()).await
    }

    pub fn chat_log(&self) -> &[ChatMessage] {
        self.session.messages()
    }

    /// One-shot AI summary of the current snapshot.
    pub async fn summarize(&mut self, snapshot: &WeatherSnapshot) -> Result<String, ChatError> {
        let name = self.location_name.clone();
        self.session
            .summarize(snapshot, &name, self.unit, Utc::now())
            .await
    }
}
