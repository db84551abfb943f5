//! JSON file backend.
//!
//! Files are written as 2-space indented JSON with a trailing newline.  The
//! top-level value must be an object; anything else is a decode error.

use std::path::{Path, PathBuf};

use configri_core::Mapping;
use tracing::debug;

use super::{read_source, write_source, Backend, BackendError};

/// A [`Backend`] for JSON files.
#[derive(Debug, Clone)]
pub struct JsonBackend {
    source: PathBuf,
}

impl JsonBackend {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Backend for JsonBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn set_source(&mut self, source: PathBuf) {
        self.source = source;
    }

    fn load(&self) -> Result<Mapping, BackendError> {
        let Some(content) = read_source(&self.source)? else {
            debug!("{} is empty; loading as empty mapping", self.source.display());
            return Ok(Mapping::new());
        };
        let data: Mapping =
            serde_json::from_str(&content).map_err(|e| BackendError::Decode {
                path: self.source.clone(),
                source: Box::new(e),
            })?;
        debug!("loaded {} keys from {}", data.len(), self.source.display());
        Ok(data)
    }

    fn create(&self, data: Mapping) -> Result<Mapping, BackendError> {
        let mut content =
            serde_json::to_string_pretty(&data).map_err(|e| BackendError::Encode {
                path: self.source.clone(),
                source: Box::new(e),
            })?;
        content.push('\n');
        write_source(&self.source, &content)?;
        debug!("wrote {} keys to {}", data.len(), self.source.display());
        Ok(data)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
