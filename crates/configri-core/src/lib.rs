//! # configri-core
//!
//! Pure domain logic for the configri configuration manager: the value
//! model, the overlay of staged (unsaved) edits on top of persisted data,
//! and best-effort casting of stored values to typed results.
//!
//! This crate performs no file I/O.  Loading and saving are the job of the
//! backends in the `configri` crate, which feed snapshots into the
//! [`OverlayStore`] defined here.
//!
//! # Architecture overview
//!
//! A configuration file is modelled as an ordered [`Mapping`] from string
//! keys to arbitrary structured values.  Two mappings are kept side by side:
//!
//! - the **persisted snapshot** – what is (or was last known to be) on disk;
//! - the **staged changes** – edits made in memory but not yet saved.
//!
//! Callers never read either one directly.  They read the **merged view**,
//! which is the persisted snapshot with the staged changes laid over it.
//! The merged view is cached and only rebuilt when new edits have been
//! staged since it was last computed.

pub mod domain;

pub use domain::cast::{to_bool, to_float, to_int, CastError, CastTarget};
pub use domain::overlay::{OverlayState, OverlayStore};

/// A single configuration value: string, number, boolean, null, array or table.
pub use serde_json::Value;

/// An ordered mapping from string keys to configuration values.
///
/// Backed by `serde_json::Map` with the `preserve_order` feature, so keys
/// iterate in insertion order and overwriting an existing key keeps its
/// original position.
pub type Mapping = serde_json::Map<String, Value>;
