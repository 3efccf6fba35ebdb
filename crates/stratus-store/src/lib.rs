//! Durable key-value preference storage for Stratus.
//!
//! A single JSON file owned by an explicit store object. Components receive
//! the store by injection; nothing reads or writes preference state
//! ambiently.

pub mod prefs;

pub use prefs::{FavoriteLocation, PrefStore, SavedLocation, StoreError};
