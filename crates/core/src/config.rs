//! Driver configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` under the
//! user's config directory, then `STATION_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "station";

const DEFAULT_CONFIG: &str = r#"# Station driver configuration.

# Platforms opened when the driver starts a station.
platforms = 4

# Number of executed commands kept in the journal.
journal_capacity = 200

# Delay between commands when replaying a script in the terminal UI.
playback_delay_ms = 150

# Directory receiving log files, relative to the working directory.
log_dir = "logs"
"#;

/// Settings consumed by the `station` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Platform count of the station opened at startup.
    pub platforms: usize,
    /// Maximum number of journal entries.
    pub journal_capacity: usize,
    /// Milliseconds between replayed script commands.
    pub playback_delay_ms: u64,
    /// Log directory.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platforms: 4,
            journal_capacity: 200,
            playback_delay_ms: 150,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration using `path` as the optional user file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("STATION"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.platforms == 0 {
            bail!("platforms must be at least 1");
        }
        if self.journal_capacity == 0 {
            bail!("journal_capacity must be at least 1");
        }
        Ok(())
    }
}

/// Location of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the commented default configuration when no file exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG).with_context(|| format!("failed to write {}", path.display()))
}
