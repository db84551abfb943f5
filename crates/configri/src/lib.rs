//! # configri
//!
//! A simple, extensible, cross-platform config manager.
//!
//! A [`ConfigManager`] loads a key/value file through a pluggable
//! [`Backend`] (JSON or TOML), serves typed reads, lets callers stage edits
//! in memory, and writes them back on [`save`](ConfigManager::save).
//! Unsaved edits are layered over the loaded data, so every read sees the
//! latest value while the file stays untouched until you decide otherwise.
//!
//! ```rust,no_run
//! use configri::{ConfigManager, Mapping, ReloadOptions};
//! use serde_json::json;
//!
//! let mut defaults = Mapping::new();
//! defaults.insert("name".into(), json!("BaseConfig"));
//! defaults.insert("version".into(), json!(13));
//!
//! // Creates config.toml from the defaults on first run.
//! let mut cfg = ConfigManager::new("config.toml", "toml", Some(defaults))?;
//! assert_eq!(cfg.get_int("version", None)?, 13);
//!
//! cfg.set("version", 14);
//! cfg.save()?;
//! cfg.reload(ReloadOptions::new().from_disk())?;
//! # Ok::<(), configri::ManagerError>(())
//! ```
//!
//! # Layers
//!
//! ```text
//! configri-core        OverlayStore, casts, Mapping  (no I/O)
//!        ↑
//! configri
//!   application/       ConfigManager, SharedConfigManager
//!   infrastructure/
//!     backend/         Backend trait, JSON, TOML, in-memory
//!     dirs             platform config directories
//! ```

pub mod application;
pub mod infrastructure;

pub use application::manager::{ConfigManager, ManagerError, ReloadOptions};
pub use application::shared::SharedConfigManager;
pub use configri_core::{CastError, CastTarget, Mapping, OverlayState, Value};
pub use infrastructure::backend::{
    Backend, BackendError, BackendKind, JsonBackend, MemoryBackend, MemoryFile, TomlBackend,
    UnsupportedBackendError,
};
pub use infrastructure::dirs::{config_dirs, ConfigDirectories, DirsError};
