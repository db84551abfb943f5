//! Best-effort casts from stored configuration values to typed results.
//!
//! Configuration files are edited by hand, so a port number may arrive as
//! `8080` in one file and as `"8080"` in another.  The functions here accept
//! both:
//!
//! | Stored value        | [`to_int`]      | [`to_float`]    | [`to_bool`] |
//! |---------------------|-----------------|-----------------|-------------|
//! | `13`                | `13`            | `13.0`          | `true`      |
//! | `13.9`              | `13` (truncate) | `13.9`          | `true`      |
//! | `true` / `false`    | `1` / `0`       | `1.0` / `0.0`   | as-is       |
//! | `" 42 "`            | `42`            | `42.0`          | `true`      |
//! | `"BaseConfig"`      | error           | error           | `true`      |
//! | `""`                | error           | error           | `false`     |
//! | `null`              | error           | error           | `false`     |
//! | `[]` / `{}`         | error           | error           | `false`     |
//! | non-empty array/map | error           | error           | `true`      |
//!
//! Boolean conversion follows truthiness and never fails: only `null`,
//! `false`, zero, the empty string and empty containers are false.

use std::fmt;

use thiserror::Error;

use crate::Value;

/// The type a value was being cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTarget {
    Int,
    Float,
    Bool,
}

impl fmt::Display for CastTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CastTarget::Int => "int",
            CastTarget::Float => "float",
            CastTarget::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A stored value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot cast {found} to {target}")]
pub struct CastError {
    /// Requested type.
    pub target: CastTarget,
    /// Short description of the offending value, e.g. `string "abc"`.
    pub found: String,
}

impl CastError {
    fn new(target: CastTarget, value: &Value) -> Self {
        Self {
            target,
            found: describe(value),
        }
    }
}

/// Casts `value` to a signed 64-bit integer.
///
/// # Errors
///
/// Returns [`CastError`] for null, arrays, tables, strings that are not a
/// base-10 integer, and floats that are non-finite or outside the `i64` range.
pub fn to_int(value: &Value) -> Result<i64, CastError> {
    let fail = || CastError::new(CastTarget::Int, value);
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                // Only reachable for u64 values above i64::MAX.
                Err(fail())
            } else {
                let f = n.as_f64().ok_or_else(fail)?;
                float_to_int(f).ok_or_else(fail)
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| fail()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(fail()),
    }
}

/// Casts `value` to a 64-bit float.
///
/// # Errors
///
/// Returns [`CastError`] for null, arrays, tables and strings that do not
/// parse as a float.
pub fn to_float(value: &Value) -> Result<f64, CastError> {
    let fail = || CastError::new(CastTarget::Float, value);
    match value {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().ok_or_else(fail),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| fail()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(fail()),
    }
}

/// Casts `value` to a boolean using truthiness.  Never fails.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    let truncated = f.trunc();
    // i64::MAX is not exactly representable; 2^63 is the first float past it.
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if truncated.is_finite() && truncated >= -TWO_POW_63 && truncated < TWO_POW_63 {
        Some(truncated as i64)
    } else {
        None
    }
}

fn describe(value: &Value) -> String {
    const MAX_SHOWN: usize = 32;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.chars().count() > MAX_SHOWN => {
            let head: String = s.chars().take(MAX_SHOWN).collect();
            format!("string {head:?}…")
        }
        Value::String(s) => format!("string {s:?}"),
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::Object(map) => format!("table with {} keys", map.len()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
