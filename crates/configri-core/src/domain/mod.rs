//! Domain entities for configri.
//!
//! Nothing in this module touches the file system.  Both sub-modules can be
//! compiled and tested in isolation.

/// Persisted snapshot + staged changes, and the cached merged view.
///
/// See [`overlay::OverlayStore`] for the main type.
pub mod overlay;

/// Best-effort conversion of stored values to `i64`, `f64` and `bool`.
pub mod cast;
