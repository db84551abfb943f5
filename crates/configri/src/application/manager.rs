//! The configuration manager: typed reads, staged writes, and the
//! reload/save/clear lifecycle on top of a [`Backend`].
//!
//! # Lifecycle
//!
//! ```text
//!   new() ──▶ load_or_create(defaults) ──▶ persisted snapshot
//!                                               │
//!   set / update ──▶ staged changes ◀───────────┤  get / get_int / data()
//!                         │                     │  read the merged view
//!        save() ──────────┴──▶ backend.save(merged view) ──▶ new snapshot
//!        clear_changes() ─────▶ staged changes dropped, no I/O
//!        reload(opts) ────────▶ staged dropped (optionally saved first),
//!                               snapshot re-read from disk
//! ```
//!
//! Defaults only seed a file that does not exist yet (or cannot be decoded).
//! They are never merged into data loaded from an existing file.
//!
//! # Concurrency
//!
//! `ConfigManager` is `Send` but not `Sync`.  Wrap it in
//! [`SharedConfigManager`](super::shared::SharedConfigManager) to use it
//! from several threads.  Concurrent writers to the same file from other
//! processes are not detected; the last `save` wins.

use std::fmt;
use std::path::PathBuf;

use configri_core::{to_bool, to_float, to_int, CastError, Mapping, OverlayStore, Value};
use thiserror::Error;
use tracing::debug;

use crate::infrastructure::backend::{
    Backend, BackendError, BackendKind, UnsupportedBackendError,
};

/// Error type for manager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The requested backend name is not registered.
    #[error(transparent)]
    UnsupportedBackend(#[from] UnsupportedBackendError),

    /// The key is absent from the merged view.
    #[error("no item with name {key:?} in config")]
    KeyNotFound { key: String },

    /// A typed getter could not cast the stored value and had no default.
    #[error("config item {key:?}: {source}")]
    TypeCast {
        key: String,
        #[source]
        source: CastError,
    },

    /// A fatal backend failure, passed through unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Flags for [`ConfigManager::reload`].  All off by default.
///
/// Steps run in this order: save (if requested and dirty), discard staged
/// changes, adopt defaults in memory, re-read from disk.  When both
/// `use_defaults` and `force_from_disk` are set, the disk read wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadOptions {
    /// Save staged changes before discarding them.
    pub save_changes_first: bool,
    /// Re-read the snapshot through [`Backend::load_or_create`].
    pub force_from_disk: bool,
    /// Replace the snapshot with the defaults (in memory only).
    pub use_defaults: bool,
}

impl ReloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saving_changes(mut self) -> Self {
        self.save_changes_first = true;
        self
    }

    pub fn from_disk(mut self) -> Self {
        self.force_from_disk = true;
        self
    }

    pub fn using_defaults(mut self) -> Self {
        self.use_defaults = true;
        self
    }
}

/// A configuration store supporting ephemeral (staged) changes.
///
/// # Examples
///
/// ```rust
/// use configri::{ConfigManager, MemoryBackend};
/// use serde_json::json;
///
/// let mut defaults = configri::Mapping::new();
/// defaults.insert("a".into(), json!(1));
///
/// let mut cfg = ConfigManager::with_backend(Box::new(MemoryBackend::new()), Some(defaults))?;
/// assert_eq!(cfg.get("a")?, &json!(1));
///
/// cfg.set("b", 2);
/// assert!(cfg.is_dirty());
/// cfg.save()?;
/// assert!(!cfg.is_dirty());
/// # Ok::<(), configri::ManagerError>(())
/// ```
pub struct ConfigManager {
    backend: Box<dyn Backend>,
    defaults: Mapping,
    overlay: OverlayStore,
}

impl ConfigManager {
    /// Opens (or creates) the config file at `source` using the backend
    /// registered under `backend` (`"json"` or `"toml"`).
    ///
    /// When the file is missing or cannot be decoded it is written with
    /// `defaults` (an empty mapping if `None`).
    ///
    /// # Errors
    ///
    /// [`ManagerError::UnsupportedBackend`] for an unknown backend name,
    /// [`ManagerError::Backend`] if the initial load-or-create fails fatally.
    pub fn new(
        source: impl Into<PathBuf>,
        backend: &str,
        defaults: Option<Mapping>,
    ) -> Result<Self, ManagerError> {
        let kind: BackendKind = backend.parse()?;
        Self::with_kind(source, kind, defaults)
    }

    /// Like [`new`](Self::new) with an already resolved [`BackendKind`].
    ///
    /// # Errors
    ///
    /// [`ManagerError::Backend`] if the initial load-or-create fails fatally.
    pub fn with_kind(
        source: impl Into<PathBuf>,
        kind: BackendKind,
        defaults: Option<Mapping>,
    ) -> Result<Self, ManagerError> {
        Self::with_backend(kind.instantiate(source), defaults)
    }

    /// Builds a manager around any [`Backend`] implementation.
    ///
    /// # Errors
    ///
    /// [`ManagerError::Backend`] if the initial load-or-create fails fatally.
    pub fn with_backend(
        backend: Box<dyn Backend>,
        defaults: Option<Mapping>,
    ) -> Result<Self, ManagerError> {
        let mut manager = Self {
            backend,
            defaults: defaults.unwrap_or_default(),
            overlay: OverlayStore::new(),
        };
        manager.reload(ReloadOptions::new().from_disk().using_defaults())?;
        Ok(manager)
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// All data with staged changes overlaid.
    pub fn data(&self) -> &Mapping {
        self.overlay.view()
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`ManagerError::KeyNotFound`] if the key is absent.
    pub fn get(&self, key: &str) -> Result<&Value, ManagerError> {
        self.data().get(key).ok_or_else(|| ManagerError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Returns the value stored under `key`, or `default` if it is absent.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.data().get(key) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data().contains_key(key)
    }

    /// Returns `key` cast to an integer.
    ///
    /// `default` replaces a failed cast; it does not replace a missing key.
    ///
    /// # Errors
    ///
    /// [`ManagerError::KeyNotFound`] if the key is absent,
    /// [`ManagerError::TypeCast`] if the cast fails and `default` is `None`.
    pub fn get_int(&self, key: &str, default: Option<i64>) -> Result<i64, ManagerError> {
        cast_or(key, to_int(self.get(key)?), default)
    }

    /// Returns `key` cast to a float.  See [`get_int`](Self::get_int).
    ///
    /// # Errors
    ///
    /// [`ManagerError::KeyNotFound`] if the key is absent,
    /// [`ManagerError::TypeCast`] if the cast fails and `default` is `None`.
    pub fn get_float(&self, key: &str, default: Option<f64>) -> Result<f64, ManagerError> {
        cast_or(key, to_float(self.get(key)?), default)
    }

    /// Returns the truthiness of `key`.
    ///
    /// The boolean cast cannot fail, so `default` is never used; it is
    /// accepted to keep the typed getters uniform.
    ///
    /// # Errors
    ///
    /// [`ManagerError::KeyNotFound`] if the key is absent.
    pub fn get_bool(&self, key: &str, default: Option<bool>) -> Result<bool, ManagerError> {
        cast_or(key, Ok(to_bool(self.get(key)?)), default)
    }

    // ── Staged writes ─────────────────────────────────────────────────────────

    /// Stages `value` under `key`.  Nothing is written until [`save`](Self::save).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        debug!("staging change to {key:?}");
        self.overlay.stage(key, value.into());
    }

    /// Stages every key of every mapping; later mappings win on duplicates.
    /// Does nothing when no keys are given.
    pub fn update<'a, I>(&mut self, mappings: I)
    where
        I: IntoIterator<Item = &'a Mapping>,
    {
        let applied = self.overlay.stage_all(mappings);
        if applied > 0 {
            debug!(
                "applied {applied} entries; {} keys now staged",
                self.overlay.staged().len()
            );
        }
    }

    /// Discards all staged changes.  No I/O.
    pub fn clear_changes(&mut self) {
        self.overlay.clear();
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Writes the merged view through the backend and adopts it as the new
    /// persisted snapshot.  Staged changes are cleared on success and kept
    /// on failure.
    ///
    /// # Errors
    ///
    /// [`ManagerError::Backend`] if the backend cannot write.
    pub fn save(&mut self) -> Result<(), ManagerError> {
        let merged = self.overlay.view().clone();
        let saved = self.backend.save(merged)?;
        debug!(
            "saved {} keys to {}",
            saved.len(),
            self.backend.source().display()
        );
        self.overlay.set_persisted(saved);
        self.overlay.clear();
        Ok(())
    }

    /// Discards staged changes and refreshes the persisted snapshot
    /// according to `options`.  See [`ReloadOptions`] for the step order.
    ///
    /// # Errors
    ///
    /// [`ManagerError::Backend`] if saving first or re-reading fails.  A
    /// failed save leaves the staged changes in place.
    pub fn reload(&mut self, options: ReloadOptions) -> Result<(), ManagerError> {
        if options.save_changes_first && self.overlay.is_dirty() {
            self.save()?;
        }

        self.overlay.clear();

        if options.use_defaults {
            self.overlay.set_persisted(self.defaults.clone());
        }
        if options.force_from_disk {
            let (data, created) = self.backend.load_or_create(self.defaults.clone())?;
            debug!(
                "reloaded {} keys from {} (created: {created})",
                data.len(),
                self.backend.source().display()
            );
            self.overlay.set_persisted(data);
        }
        Ok(())
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    /// `true` while staged changes exist.
    pub fn is_dirty(&self) -> bool {
        self.overlay.is_dirty()
    }

    /// Changes staged since the last save, clear or reload.
    pub fn staged(&self) -> &Mapping {
        self.overlay.staged()
    }

    /// The last snapshot read from or written to the backend.
    pub fn persisted(&self) -> &Mapping {
        self.overlay.persisted()
    }

    /// Values used to seed a missing file.
    pub fn defaults(&self) -> &Mapping {
        &self.defaults
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Mutable access to the backend, e.g. to repoint it with
    /// [`Backend::set_source`].  Call [`reload`](Self::reload) afterwards to
    /// read from the new location.
    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }
}

fn cast_or<T>(key: &str, cast: Result<T, CastError>, default: Option<T>) -> Result<T, ManagerError> {
    match (cast, default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default),
        (Err(source), None) => Err(ManagerError::TypeCast {
            key: key.to_string(),
            source,
        }),
    }
}

impl fmt::Display for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigManager({}, {}, ...)",
            self.backend.source().display(),
            self.backend.name()
        )
    }
}

impl fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("source", &self.backend.source())
            .field("backend", &self.backend.name())
            .field("defaults", &self.defaults)
            .field("overlay", &self.overlay)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
