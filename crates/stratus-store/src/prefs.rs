//! JSON-file preference store.
//!
//! Every key is read once at startup and written back on the corresponding
//! state change. A corrupt or missing file falls back to the documented
//! defaults without failing startup.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default city shown before the user ever picks a location
const DEFAULT_LOCATION_NAME: &str = "New York, NY";
const DEFAULT_LATITUDE: f64 = 40.7128;
const DEFAULT_LONGITUDE: f64 = -74.0060;

/// Preference store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write preferences: {0}")]
    WriteFailed(String),
}

/// The last viewed location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl Default for SavedLocation {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            name: DEFAULT_LOCATION_NAME.to_string(),
        }
    }
}

/// One saved favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Prefs {
    #[serde(default)]
    last_location: Option<SavedLocation>,
    #[serde(default)]
    dark_mode: bool,
    #[serde(default)]
    favorites: Vec<FavoriteLocation>,
    #[serde(default)]
    dismissed_alerts: BTreeSet<String>,
}

/// Explicit store object owning all persisted user preferences.
#[derive(Debug)]
pub struct PrefStore {
    path: PathBuf,
    prefs: Mutex<Prefs>,
}

impl PrefStore {
    /// Open the store, reading the file once. Never fails: unreadable or
    /// corrupt contents are replaced by defaults (and logged).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = Self::read_file(&path);
        Self {
            path,
            prefs: Mutex::new(prefs),
        }
    }

    fn read_file(path: &Path) -> Prefs {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Prefs::default(),
            Err(e) => {
                tracing::warn!("Failed to read preferences, using defaults: {}", e);
                return Prefs::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Preferences file is corrupt, using defaults: {}", e);
                Prefs::default()
            }
        }
    }

    fn persist(&self, prefs: &Prefs) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(prefs).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| StoreError::WriteFailed(e.to_string()))
    }

    /// Last viewed location, or the default city.
    pub fn last_location(&self) -> SavedLocation {
        self.prefs.lock().last_location.clone().unwrap_or_default()
    }

    pub fn set_last_location(
        &self,
        latitude: f64,
        longitude: f64,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut prefs = self.prefs.lock();
        prefs.last_location = Some(SavedLocation {
            latitude,
            longitude,
            name: name.to_string(),
        });
        self.persist(&prefs)
    }

    pub fn dark_mode(&self) -> bool {
        self.prefs.lock().dark_mode
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StoreError> {
        let mut prefs = self.prefs.lock();
        prefs.dark_mode = enabled;
        self.persist(&prefs)
    }

    pub fn favorites(&self) -> Vec<FavoriteLocation> {
        self.prefs.lock().favorites.clone()
    }

    /// Add a favorite. Duplicate coordinates are ignored.
    pub fn add_favorite(&self, favorite: FavoriteLocation) -> Result<(), StoreError> {
        let mut prefs = self.prefs.lock();
        let exists = prefs
            .favorites
            .iter()
            .any(|f| f.latitude == favorite.latitude && f.longitude == favorite.longitude);
        if exists {
            return Ok(());
        }
        prefs.favorites.push(favorite);
        self.persist(&prefs)
    }

    pub fn remove_favorite(&self, latitude: f64, longitude: f64) -> Result<(), StoreError> {
        let mut prefs = self.prefs.lock();
        prefs
            .favorites
            .retain(|f| f.latitude != latitude || f.longitude != longitude);
        self.persist(&prefs)
    }

    pub fn dismissed_alerts(&self) -> BTreeSet<String> {
        self.prefs.lock().dismissed_alerts.clone()
    }

    pub fn is_dismissed(&self, alert_id: &str) -> bool {
        self.prefs.lock().dismissed_alerts.contains(alert_id)
    }

    pub fn dismiss_alert(&self, alert_id: &str) -> Result<(), StoreError> {
        let mut prefs = self.prefs.lock();
        prefs.dismissed_alerts.insert(alert_id.to_string());
        self.persist(&prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> PrefStore {
        PrefStore::open(dir.path().join("prefs.json"))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let loc = store.last_location();
        assert_eq!(loc.name, "New York, NY");
        assert!(!store.dark_mode());
        assert!(store.favorites().is_empty());
        assert!(store.dismissed_alerts().is_empty());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = PrefStore::open(&path);
        assert_eq!(store.last_location().name, "New York, NY");
    }

    #[test]
    fn test_last_location_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let store = PrefStore::open(&path);
            store.set_last_location(47.6062, -122.3321, "Seattle, WA").unwrap();
        }
        let reopened = PrefStore::open(&path);
        let loc = reopened.last_location();
        assert_eq!(loc.name, "Seattle, WA");
        assert_eq!(loc.latitude, 47.6062);
    }

    #[test]
    fn test_favorite_dedup_by_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let favorite = FavoriteLocation {
            name: "Paris, France".into(),
            latitude: 48.8566,
            longitude: 2.3522,
        };
        store.add_favorite(favorite.clone()).unwrap();
        store.add_favorite(favorite).unwrap();
        assert_eq!(store.favorites().len(), 1);
    }

    #[test]
    fn test_remove_favorite() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .add_favorite(FavoriteLocation {
                name: "Paris, France".into(),
                latitude: 48.8566,
                longitude: 2.3522,
            })
            .unwrap();
        store.remove_favorite(48.8566, 2.3522).unwrap();
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn test_dismissed_alerts_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let store = PrefStore::open(&path);
            store.dismiss_alert("thunderstorm-2024-06-01").unwrap();
            assert!(store.is_dismissed("thunderstorm-2024-06-01"));
        }
        let reopened = PrefStore::open(&path);
        assert!(reopened.is_dismissed("thunderstorm-2024-06-01"));
        assert!(!reopened.is_dismissed("uv-2024-06-01"));
    }

    #[test]
    fn test_dark_mode_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let store = PrefStore::open(&path);
            store.set_dark_mode(true).unwrap();
        }
        assert!(PrefStore::open(&path).dark_mode());
    }
}
