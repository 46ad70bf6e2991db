//! Cached settings provider
//!
//! [`SettingsProvider`] owns a single-slot cache in front of a
//! [`SettingsLoader`]. The first `get()` resolves and stores the settings;
//! later calls return the same `Arc` until [`SettingsProvider::clear`].
//!
//! Concurrent first calls share one in-flight resolution: the slot holds a
//! `OnceLock` cell, and every caller that picked up the same cell blocks on
//! it and receives its outcome. A failed cell is evicted, so failures never
//! populate the cache.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use super::loader::SettingsLoader;
use super::settings::Settings;
use crate::utils::errors::Result;
use crate::utils::logging;

type Outcome = Result<Arc<Settings>>;

/// Single-slot settings cache
#[derive(Debug)]
pub struct SettingsProvider {
    loader: SettingsLoader,
    slot: Mutex<Option<Arc<OnceLock<Outcome>>>>,
}

impl SettingsProvider {
    pub fn new(loader: SettingsLoader) -> Self {
        Self {
            loader,
            slot: Mutex::new(None),
        }
    }

    /// Cached settings, resolving them on first use
    pub fn get(&self) -> Result<Arc<Settings>> {
        let cell = {
            let mut slot = self.lock_slot();
            Arc::clone(slot.get_or_insert_with(|| Arc::new(OnceLock::new())))
        };

        let outcome = cell
            .get_or_init(|| {
                logging::log_cache_event("resolve");
                self.loader.load().map(Arc::new)
            })
            .clone();

        if outcome.is_err() {
            let mut slot = self.lock_slot();
            if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, &cell)) {
                *slot = None;
                logging::log_cache_event("evict-failed");
            }
        }
        outcome
    }

    /// Drop the cached settings; the next `get()` resolves again
    pub fn clear(&self) {
        if self.lock_slot().take().is_some() {
            logging::log_cache_event("clear");
        }
    }

    /// Whether a successful resolution is currently cached
    pub fn is_cached(&self) -> bool {
        self.lock_slot()
            .as_ref()
            .and_then(|cell| cell.get())
            .is_some_and(|outcome| outcome.is_ok())
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Arc<OnceLock<Outcome>>>> {
        // The slot is only ever swapped whole, so a poisoned lock holds a valid value.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SettingsProvider {
    fn default() -> Self {
        Self::new(SettingsLoader::new())
    }
}

static DEFAULT_PROVIDER: OnceLock<SettingsProvider> = OnceLock::new();

/// Process-wide provider reading `.env` and the environment
pub fn default_provider() -> &'static SettingsProvider {
    DEFAULT_PROVIDER.get_or_init(SettingsProvider::default)
}

/// Cached application settings
pub fn get_settings() -> Result<Arc<Settings>> {
    default_provider().get()
}

/// Evict the process-wide cached settings
pub fn clear_settings_cache() {
    default_provider().clear()
}
