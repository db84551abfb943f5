//! configri: inspect and edit configri-managed files from the shell.
//!
//! # Usage
//!
//! ```text
//! configri [OPTIONS] <COMMAND>
//!
//! Commands:
//!   show                     Print all values as pretty JSON
//!   get  <KEY> [--as TYPE]   Print one value (TYPE: str, int, float, bool)
//!   set  <KEY> <VALUE>...    Set KEY=VALUE pairs and save
//!   init [--defaults JSON]   Create the file from defaults if it is missing
//!
//! Options:
//!   --file    <PATH>         Config file [env: CONFIGRI_FILE] [default: config.json]
//!   --backend <NAME>         json or toml [env: CONFIGRI_BACKEND]
//!                            [default: inferred from the extension, else json]
//! ```
//!
//! Values given to `set` are parsed as JSON first (`13`, `true`, `[1,2]`,
//! `{"a":1}`) and fall back to a plain string (`hello`).
//!
//! `show` and `get` never create files: they fail when `--file` does not
//! exist.  `set` and `init` create it (from defaults) when it is missing.
//!
//! Results go to stdout, logs to stderr.  Set `RUST_LOG=debug` to see every
//! load and save.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use configri::{BackendKind, ConfigManager, Mapping, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit configuration files managed by configri.
#[derive(Debug, Parser)]
#[command(name = "configri", version)]
struct Cli {
    /// Path of the configuration file.
    #[arg(long, default_value = "config.json", env = "CONFIGRI_FILE")]
    file: PathBuf,

    /// Storage backend.  Inferred from the file extension when omitted.
    #[arg(long, env = "CONFIGRI_BACKEND")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the whole configuration as pretty JSON.
    Show,

    /// Print the value stored under KEY.
    Get {
        key: String,
        /// Cast the value before printing.
        #[arg(long = "as", value_enum, default_value_t = As::Raw)]
        as_type: As,
    },

    /// Set one or more KEY VALUE pairs and save.
    Set {
        key: String,
        value: String,
        /// Further KEY VALUE pairs.
        #[arg(num_args = 0..)]
        more: Vec<String>,
    },

    /// Create the file from defaults if it does not exist yet.
    Init {
        /// Defaults as a JSON object.
        #[arg(long, default_value = "{}")]
        defaults: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum As {
    Raw,
    Str,
    Int,
    Float,
    Bool,
}

impl Cli {
    /// Resolves `--backend`, falling back to the file extension, then JSON.
    fn backend_kind(&self) -> anyhow::Result<BackendKind> {
        match &self.backend {
            Some(name) => Ok(name.parse()?),
            None => Ok(BackendKind::from_path(&self.file).unwrap_or(BackendKind::Json)),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let kind = cli.backend_kind()?;
    debug!("using {kind} backend for {}", cli.file.display());

    match cli.command {
        Command::Show => {
            let cfg = open_existing(&cli.file, kind)?;
            println!("{}", serde_json::to_string_pretty(cfg.data())?);
        }
        Command::Get { key, as_type } => {
            let cfg = open_existing(&cli.file, kind)?;
            println!("{}", render(&cfg, &key, as_type)?);
        }
        Command::Set { key, value, more } => {
            if more.len() % 2 != 0 {
                bail!("expected KEY VALUE pairs, got a trailing key {:?}", more[more.len() - 1]);
            }
            let mut cfg = open(&cli.file, kind, None)?;
            let mut changes = Mapping::new();
            changes.insert(key, parse_value(&value));
            for pair in more.chunks_exact(2) {
                changes.insert(pair[0].clone(), parse_value(&pair[1]));
            }
            let count = changes.len();
            cfg.update([&changes]);
            cfg.save()
                .with_context(|| format!("failed to save {}", cli.file.display()))?;
            info!("saved {count} change(s) to {}", cli.file.display());
        }
        Command::Init { defaults } => {
            let defaults: Mapping = serde_json::from_str(&defaults)
                .context("--defaults must be a JSON object")?;
            let cfg = open(&cli.file, kind, Some(defaults))?;
            info!("{} holds {} keys", cli.file.display(), cfg.data().len());
        }
    }

    Ok(())
}

fn open(file: &Path, kind: BackendKind, defaults: Option<Mapping>) -> anyhow::Result<ConfigManager> {
    ConfigManager::with_kind(file, kind, defaults)
        .with_context(|| format!("failed to open {}", file.display()))
}

/// Opens `file` for reading only; a missing file is an error, not created.
fn open_existing(file: &Path, kind: BackendKind) -> anyhow::Result<ConfigManager> {
    if !file.is_file() {
        bail!("config file {} does not exist", file.display());
    }
    open(file, kind, None)
}

/// Parses a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn render(cfg: &ConfigManager, key: &str, as_type: As) -> anyhow::Result<String> {
    let rendered = match as_type {
        As::Raw => serde_json::to_string_pretty(cfg.get(key)?)?,
        As::Str => match cfg.get(key)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        As::Int => cfg.get_int(key, None)?.to_string(),
        As::Float => cfg.get_float(key, None)?.to_string(),
        As::Bool => cfg.get_bool(key, None)?.to_string(),
    };
    Ok(rendered)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
