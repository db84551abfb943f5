//! A thread-safe handle to a [`ConfigManager`].
//!
//! Reading the merged view may rebuild a cache, and a read-modify-write such
//! as "increment a counter" spans several calls, so the manager sits behind
//! one `Mutex` that is held for the whole of each operation.  Use
//! [`SharedConfigManager::with`] when several steps must happen atomically.

use std::sync::{Arc, Mutex, MutexGuard};

use configri_core::{Mapping, Value};

use super::manager::{ConfigManager, ManagerError, ReloadOptions};

/// Cloneable, `Send + Sync` wrapper around a [`ConfigManager`].
///
/// Values are returned as owned clones because the lock is released before
/// the call returns.
#[derive(Debug, Clone)]
pub struct SharedConfigManager {
    inner: Arc<Mutex<ConfigManager>>,
}

impl SharedConfigManager {
    pub fn new(manager: ConfigManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Runs `f` with exclusive access to the manager.
    pub fn with<R>(&self, f: impl FnOnce(&mut ConfigManager) -> R) -> R {
        f(&mut self.lock())
    }

    /// Snapshot of the merged view.
    pub fn data(&self) -> Mapping {
        self.lock().data().clone()
    }

    /// # Errors
    ///
    /// [`ManagerError::KeyNotFound`] if the key is absent.
    pub fn get(&self, key: &str) -> Result<Value, ManagerError> {
        self.lock().get(key).cloned()
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.lock().get_or(key, default)
    }

    /// # Errors
    ///
    /// See [`ConfigManager::get_int`].
    pub fn get_int(&self, key: &str, default: Option<i64>) -> Result<i64, ManagerError> {
        self.lock().get_int(key, default)
    }

    /// # Errors
    ///
    /// See [`ConfigManager::get_float`].
    pub fn get_float(&self, key: &str, default: Option<f64>) -> Result<f64, ManagerError> {
        self.lock().get_float(key, default)
    }

    /// # Errors
    ///
    /// See [`ConfigManager::get_bool`].
    pub fn get_bool(&self, key: &str, default: Option<bool>) -> Result<bool, ManagerError> {
        self.lock().get_bool(key, default)
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.lock().set(key, value);
    }

    pub fn update<'a, I>(&self, mappings: I)
    where
        I: IntoIterator<Item = &'a Mapping>,
    {
        self.lock().update(mappings);
    }

    pub fn clear_changes(&self) {
        self.lock().clear_changes();
    }

    /// # Errors
    ///
    /// See [`ConfigManager::save`].
    pub fn save(&self) -> Result<(), ManagerError> {
        self.lock().save()
    }

    /// # Errors
    ///
    /// See [`ConfigManager::reload`].
    pub fn reload(&self, options: ReloadOptions) -> Result<(), ManagerError> {
        self.lock().reload(options)
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    fn lock(&self) -> MutexGuard<'_, ConfigManager> {
        // A panic inside `with` can at worst leave extra staged changes,
        // which is still a valid state.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl From<ConfigManager> for SharedConfigManager {
    fn from(manager: ConfigManager) -> Self {
        Self::new(manager)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
