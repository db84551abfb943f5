//! Platform-appropriate locations for an application's config, data and
//! cache directories.
//!
//! When `XDG_CONFIG_HOME`, `XDG_DATA_HOME` and `XDG_CACHE_HOME` are *all* set,
//! they are used as-is.  Otherwise every directory lives under one
//! per-application base:
//!
//! - Windows:        `%APPDATA%\<app>\{config,data,cache}`
//! - Linux / macOS:  `$HOME/.<app>/{config,data,cache}`

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

const XDG_VARS: [&str; 3] = ["XDG_CONFIG_HOME", "XDG_DATA_HOME", "XDG_CACHE_HOME"];

/// Error type for directory resolution.
#[derive(Debug, Error)]
pub enum DirsError {
    /// Neither the XDG variables nor the platform base variable are set.
    #[error("could not determine a base directory for {app_name:?}")]
    NoBaseDir { app_name: String },

    /// A directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The three directories an application stores files in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDirectories {
    pub config: PathBuf,
    pub data: PathBuf,
    pub cache: PathBuf,
}

/// Resolves the directories for `app_name`, creating them when `create` is set.
///
/// # Errors
///
/// [`DirsError::NoBaseDir`] when no base directory can be derived from the
/// environment, [`DirsError::Io`] when `create` is set and a directory
/// cannot be created.
pub fn config_dirs(app_name: &str, create: bool) -> Result<ConfigDirectories, DirsError> {
    config_dirs_from(app_name, create, |key| env::var_os(key))
}

/// [`config_dirs`] with an injectable environment lookup.
fn config_dirs_from<F>(app_name: &str, create: bool, var: F) -> Result<ConfigDirectories, DirsError>
where
    F: Fn(&str) -> Option<OsString>,
{
    let dirs = match xdg_dirs(&var) {
        Some(dirs) => dirs,
        None => {
            let base = platform_base_dir(app_name, &var).ok_or_else(|| DirsError::NoBaseDir {
                app_name: app_name.to_string(),
            })?;
            ConfigDirectories {
                config: base.join("config"),
                data: base.join("data"),
                cache: base.join("cache"),
            }
        }
    };

    if create {
        for dir in [&dirs.config, &dirs.data, &dirs.cache] {
            std::fs::create_dir_all(dir).map_err(|source| DirsError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        debug!("ensured config directories under {}", dirs.config.display());
    }

    Ok(dirs)
}

fn xdg_dirs<F>(var: &F) -> Option<ConfigDirectories>
where
    F: Fn(&str) -> Option<OsString>,
{
    let [config, data, cache] = XDG_VARS.map(|key| var(key).map(PathBuf::from));
    Some(ConfigDirectories {
        config: config?,
        data: data?,
        cache: cache?,
    })
}

/// Resolves the per-application base directory.
fn platform_base_dir<F>(app_name: &str, var: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        var("APPDATA").map(|p| PathBuf::from(p).join(app_name))
    }

    #[cfg(not(target_os = "windows"))]
    {
        var("HOME").map(|h| PathBuf::from(h).join(format!(".{app_name}")))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
