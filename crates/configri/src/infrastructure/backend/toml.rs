//! TOML file backend.
//!
//! TOML has no null, so a mapping containing `null` anywhere cannot be
//! written and fails with [`BackendError::Encode`].
//!
//! Datetimes, dates and times load as their TOML text
//! (`1979-05-27T07:32:00Z`) and are written back as strings.

use std::path::{Path, PathBuf};

use configri_core::{Mapping, Value};
use tracing::debug;

use super::{read_source, write_source, Backend, BackendError};

/// A [`Backend`] for TOML files.
#[derive(Debug, Clone)]
pub struct TomlBackend {
    source: PathBuf,
}

impl TomlBackend {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Backend for TomlBackend {
    fn name(&self) -> &'static str {
        "toml"
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
        let table: ::toml::Table = ::toml::from_str(&content).map_err(|e| BackendError::Decode {
            path: self.source.clone(),
            source: Box::new(e),
        })?;
        let data = table_to_mapping(table);
        debug!("loaded {} keys from {}", data.len(), self.source.display());
        Ok(data)
    }

    fn create(&self, data: Mapping) -> Result<Mapping, BackendError> {
        let content = ::toml::to_string_pretty(&data).map_err(|e| BackendError::Encode {
            path: self.source.clone(),
            source: Box::new(e),
        })?;
        write_source(&self.source, &content)?;
        debug!("wrote {} keys to {}", data.len(), self.source.display());
        Ok(data)
    }
}

fn table_to_mapping(table: ::toml::Table) -> Mapping {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_value(value)))
        .collect()
}

fn toml_to_value(value: ::toml::Value) -> Value {
    match value {
        ::toml::Value::String(s) => Value::String(s),
        ::toml::Value::Integer(i) => Value::from(i),
        // nan and inf have no JSON number form and become null.
        ::toml::Value::Float(f) => Value::from(f),
        ::toml::Value::Boolean(b) => Value::Bool(b),
        ::toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        ::toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_value).collect()),
        ::toml::Value::Table(table) => Value::Object(table_to_mapping(table)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
