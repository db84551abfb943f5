//! Storage backends: one implementation of [`Backend`] per on-disk format.
//!
//! A backend knows how to turn a file into a [`Mapping`] and back.  The
//! [`ConfigManager`](crate::ConfigManager) never touches files itself; it
//! only calls the five operations of the [`Backend`] trait.
//!
//! # Adding a format
//!
//! Implement [`Backend`] (usually only `load` and `create` need real work),
//! add a variant to [`BackendKind`] and a match arm in
//! [`BackendKind::instantiate`].  Nothing in the manager changes.
//!
//! # Error recovery
//!
//! [`Backend::load_or_create`] treats two failures as "no usable file":
//!
//! - [`BackendError::NotFound`] – the file does not exist;
//! - [`BackendError::Decode`]   – the file exists but is not valid for the format.
//!
//! Both are logged and answered by writing the defaults.  Every other error
//! (permission denied, disk full, path is a directory) is returned unchanged.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use configri_core::Mapping;
use thiserror::Error;
use tracing::warn;

pub mod json;
pub mod memory;
pub mod toml;

pub use self::json::JsonBackend;
pub use self::memory::{MemoryBackend, MemoryFile};
pub use self::toml::TomlBackend;

/// Boxed error from a format's parser or serializer.
pub type FormatError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The source file does not exist.
    #[error("config file {path} does not exist")]
    NotFound { path: PathBuf },

    /// The file content is not valid for the backend's format.
    #[error("config file {path} could not be decoded: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// The data cannot be represented in the backend's format.
    #[error("config data could not be encoded for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// Any other file-system failure.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BackendError {
    /// `true` for the failures [`Backend::load_or_create`] recovers from by
    /// writing defaults.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BackendError::NotFound { .. } | BackendError::Decode { .. })
    }
}

/// Loads and stores a [`Mapping`] at a source location.
pub trait Backend: Send {
    /// Short format name, e.g. `"json"`.
    fn name(&self) -> &'static str;

    /// The file this backend reads and writes.
    fn source(&self) -> &Path;

    /// Points the backend at a different file.  Performs no I/O.
    fn set_source(&mut self, source: PathBuf);

    /// Reads and decodes the source file.
    ///
    /// Empty content decodes to an empty mapping.
    ///
    /// # Errors
    ///
    /// [`BackendError::NotFound`] if the file is absent,
    /// [`BackendError::Decode`] if the content is malformed, and
    /// [`BackendError::Io`] for any other read failure.
    fn load(&self) -> Result<Mapping, BackendError>;

    /// Serializes `data` and overwrites the source file with it.
    ///
    /// Returns `data` unchanged as confirmation of what was written.
    ///
    /// # Errors
    ///
    /// [`BackendError::Encode`] if `data` cannot be represented in the
    /// format, [`BackendError::Io`] if the write fails.
    fn create(&self, data: Mapping) -> Result<Mapping, BackendError>;

    /// Persists `data`.  Same as [`create`](Self::create) unless a backend
    /// needs different write semantics.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    fn save(&self, data: Mapping) -> Result<Mapping, BackendError> {
        self.create(data)
    }

    /// Loads the source file, writing `defaults` to it first if it is
    /// missing or unreadable.
    ///
    /// Returns the data together with `true` when the defaults were written,
    /// `false` when existing data was loaded.
    ///
    /// # Errors
    ///
    /// Any error from [`load`](Self::load) that is not
    /// [recoverable](BackendError::is_recoverable), or any error from
    /// [`create`](Self::create).
    fn load_or_create(&self, defaults: Mapping) -> Result<(Mapping, bool), BackendError> {
        match self.load() {
            Ok(data) => Ok((data, false)),
            Err(e) if e.is_recoverable() => {
                warn!("{e}; creating it from defaults");
                let data = self.create(defaults)?;
                Ok((data, true))
            }
            Err(e) => Err(e),
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The formats that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Json,
    Toml,
}

impl BackendKind {
    /// Every registered kind, in registration order.
    pub const ALL: [BackendKind; 2] = [BackendKind::Json, BackendKind::Toml];

    /// Registry name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Json => "json",
            BackendKind::Toml => "toml",
        }
    }

    /// Infers the kind from a file extension (`config.toml` → `Toml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    /// Creates a backend of this kind reading and writing `source`.
    pub fn instantiate(self, source: impl Into<PathBuf>) -> Box<dyn Backend> {
        let source = source.into();
        match self {
            BackendKind::Json => Box::new(JsonBackend::new(source)),
            BackendKind::Toml => Box::new(TomlBackend::new(source)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Requested backend name is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported backend {name:?} (available: json, toml)")]
pub struct UnsupportedBackendError {
    pub name: String,
}

impl FromStr for BackendKind {
    type Err = UnsupportedBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedBackendError { name: s.to_string() })
    }
}

// ── Shared file helpers ───────────────────────────────────────────────────────

/// Reads the whole source file.
///
/// Returns `Ok(None)` when the file is empty or contains only whitespace,
/// so backends can map it to an empty mapping without running a parser.
pub(crate) fn read_source(path: &Path) -> Result<Option<String>, BackendError> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BackendError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(BackendError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Overwrites the source file with `content`, creating parent directories.
pub(crate) fn write_source(path: &Path, content: &str) -> Result<(), BackendError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| BackendError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| BackendError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
