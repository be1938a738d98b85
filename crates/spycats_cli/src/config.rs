//! CLI configuration: flags with environment fallbacks.
//!
//! # Responsibility
//! - Declare global flags shared by every subcommand.
//! - Resolve them into a validated `CliConfig` before any work starts.
//!
//! # Invariants
//! - A breeds file, when given, takes precedence over the breeds URL.
//! - `log_dir` is always absolute after resolution.

use anyhow::{Context, Result};
use clap::Args;
use spycats_core::default_log_level;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE: &str = "spycats.sqlite3";
pub const DEFAULT_BREEDS_URL: &str = "https://api.thecatapi.com/v1/breeds";

/// Global flags. Every flag can also be set through its `SPYCATS_*` variable.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// SQLite database file.
    #[arg(long, env = "SPYCATS_DB", default_value = DEFAULT_DB_FILE, global = true)]
    pub db: PathBuf,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "SPYCATS_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "SPYCATS_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Breed catalog JSON file, used instead of fetching the catalog.
    #[arg(long, env = "SPYCATS_BREEDS_FILE", global = true)]
    pub breeds_file: Option<PathBuf>,

    /// Breed catalog endpoint.
    #[arg(long, env = "SPYCATS_BREEDS_URL", default_value = DEFAULT_BREEDS_URL, global = true)]
    pub breeds_url: String,
}

/// Where the breed catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreedSource {
    File(PathBuf),
    Url(String),
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub breed_source: BreedSource,
}

impl CliConfig {
    pub fn resolve(args: ConfigArgs) -> Result<Self> {
        let log_dir = match args.log_dir {
            Some(dir) => Some(absolutize(&dir)?),
            None => None,
        };
        let breed_source = match args.breeds_file {
            Some(path) => BreedSource::File(path),
            None => BreedSource::Url(args.breeds_url),
        };

        Ok(Self {
            db_path: args.db,
            log_level: args
                .log_level
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
            breed_source,
        })
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}
