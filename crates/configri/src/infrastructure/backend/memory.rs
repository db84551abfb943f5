//! In-memory backend for tests and embedding.
//!
//! Behaves like a file backend without touching the disk.  The simulated
//! file lives behind an `Arc<Mutex<_>>`, so a test can keep a
//! [`MemoryBackend`] clone after handing the original to a
//! [`ConfigManager`](crate::ConfigManager) and inspect or corrupt what was
//! "written".

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use configri_core::Mapping;

use super::{Backend, BackendError};

/// What the simulated file currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryFile {
    /// No file; `load` fails with [`BackendError::NotFound`].
    Missing,
    /// Unparseable content; `load` fails with [`BackendError::Decode`].
    Corrupt,
    /// A decoded file.
    Present(Mapping),
    /// The file cannot be read at all; `load` fails with [`BackendError::Io`].
    Unreadable(io::ErrorKind),
}

#[derive(Debug)]
struct Inner {
    file: MemoryFile,
    writes: usize,
    write_error: Option<io::ErrorKind>,
}

/// A [`Backend`] that keeps its "file" in memory.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    source: PathBuf,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    /// Creates a backend whose file does not exist yet.
    pub fn new() -> Self {
        Self::with_file(MemoryFile::Missing)
    }

    /// Creates a backend whose file already holds `data`.
    pub fn with_data(data: Mapping) -> Self {
        Self::with_file(MemoryFile::Present(data))
    }

    /// Creates a backend in an arbitrary starting state.
    pub fn with_file(file: MemoryFile) -> Self {
        Self {
            source: PathBuf::from(":memory:"),
            inner: Arc::new(Mutex::new(Inner {
                file,
                writes: 0,
                write_error: None,
            })),
        }
    }

    /// Current content of the simulated file.
    pub fn file(&self) -> MemoryFile {
        self.lock().file.clone()
    }

    /// Replaces the simulated file, as an external writer would.
    pub fn set_file(&self, file: MemoryFile) {
        self.lock().file = file;
    }

    /// Makes every following write fail with `kind`, or succeed again with `None`.
    pub fn set_write_error(&self, kind: Option<io::ErrorKind>) {
        self.lock().write_error = kind;
    }

    /// Number of successful `create`/`save` calls so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded data is always left consistent, so a poisoned lock is safe to reuse.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn set_source(&mut self, source: PathBuf) {
        self.source = source;
    }

    fn load(&self) -> Result<Mapping, BackendError> {
        match &self.lock().file {
            MemoryFile::Missing => Err(BackendError::NotFound {
                path: self.source.clone(),
            }),
            MemoryFile::Corrupt => Err(BackendError::Decode {
                path: self.source.clone(),
                source: "simulated corrupt content".into(),
            }),
            MemoryFile::Present(data) => Ok(data.clone()),
            MemoryFile::Unreadable(kind) => Err(BackendError::Io {
                path: self.source.clone(),
                source: io::Error::from(*kind),
            }),
        }
    }

    fn create(&self, data: Mapping) -> Result<Mapping, BackendError> {
        let mut inner = self.lock();
        if let Some(kind) = inner.write_error {
            return Err(BackendError::Io {
                path: self.source.clone(),
                source: io::Error::from(kind),
            });
        }
        inner.file = MemoryFile::Present(data.clone());
        inner.writes += 1;
        Ok(data)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one_key() -> Mapping {
        let mut m = Mapping::new();
        m.insert("k".into(), json!("v"));
        m
    }

    #[test]
    fn test_missing_file_loads_as_not_found() {
        let backend = MemoryBackend::new();
        assert!(matches!(backend.load(), Err(BackendError::NotFound { .. })));
    }

    #[test]
    fn test_corrupt_file_loads_as_decode_error() {
        let backend = MemoryBackend::with_file(MemoryFile::Corrupt);
        assert!(matches!(backend.load(), Err(BackendError::Decode { .. })));
    }

    #[test]
    fn test_unreadable_file_is_fatal_for_load_or_create() {
        let backend =
            MemoryBackend::with_file(MemoryFile::Unreadable(io::ErrorKind::PermissionDenied));

        let err = backend.load_or_create(one_key()).unwrap_err();

        assert!(matches!(err, BackendError::Io { .. }));
        assert_eq!(backend.writes(), 0, "fatal errors must not trigger a create");
    }

    #[test]
    fn test_write_error_fails_create_without_changing_file() {
        // Arrange
        let backend = MemoryBackend::with_data(one_key());
        backend.set_write_error(Some(io::ErrorKind::PermissionDenied));

        // Act
        let result = backend.create(Mapping::new());

        // Assert
        assert!(matches!(result, Err(BackendError::Io { .. })));
        assert_eq!(backend.file(), MemoryFile::Present(one_key()));
        assert_eq!(backend.writes(), 0);
    }

    #[test]
    fn test_clone_shares_the_simulated_file() {
        // Arrange
        let backend = MemoryBackend::new();
        let observer = backend.clone();

        // Act
        backend.create(one_key()).unwrap();

        // Assert
        assert_eq!(observer.file(), MemoryFile::Present(one_key()));
        assert_eq!(observer.writes(), 1);
    }

    #[test]
    fn test_load_or_create_recovers_from_corrupt_file() {
        let backend = MemoryBackend::with_file(MemoryFile::Corrupt);

        let (data, created) = backend.load_or_create(one_key()).unwrap();

        assert!(created);
        assert_eq!(data, one_key());
        assert_eq!(backend.file(), MemoryFile::Present(one_key()));
    }

    #[test]
    fn test_load_or_create_does_not_write_when_file_present() {
        let backend = MemoryBackend::with_data(one_key());

        let (_, created) = backend.load_or_create(Mapping::new()).unwrap();

        assert!(!created);
        assert_eq!(backend.writes(), 0);
    }
}
