//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MBOXFROM_CONFIG` (environment variable)
//! 2. `~/.config/mboxfrom/config.toml` (Linux/macOS)
//!    `%APPDATA%\mboxfrom\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Separator scanning settings.
    pub scan: ScanConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// `strftime` format string for printed delivery dates.
    pub date_format: String,
}

/// Separator scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Skip separators that are not preceded by a blank line.
    /// When false they are still reported, with a warning.
    pub require_blank_line: bool,
    /// Strip a UTF-8 BOM at the start of the first line.
    pub strip_bom: bool,
    /// Size of the buffer the envelope sender is copied into, terminator included.
    pub sender_capacity: usize,
    /// Longest line kept in memory; the rest of a longer line is skipped.
    pub max_line_length: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            require_blank_line: false,
            strip_bom: true,
            sender_capacity: 256,
            max_line_length: 64 * 1024, // 64 KB
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found. A file that
/// exists but cannot be read or parsed is an error.
pub fn load_config() -> Result<Config> {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Ok(Config::default()),
    }
}

/// Load configuration from an explicit file.
///
/// Rejects a `date_format` that chrono cannot render.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScanError::FileNotFound(path.to_path_buf())
        } else {
            ScanError::io(path, e)
        }
    })?;
    let config = toml::from_str::<Config>(&contents).map_err(|e| ScanError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if !is_valid_date_format(&config.general.date_format) {
        return Err(ScanError::InvalidConfig {
            path: path.to_path_buf(),
            reason: format!(
                "invalid date_format '{}'",
                config.general.date_format
            ),
        });
    }
    Ok(config)
}

/// Whether `fmt` is a `strftime` string chrono can render.
///
/// Formatting a date with an invalid string panics inside `Display`.
pub fn is_valid_date_format(fmt: &str) -> bool {
    !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
    save_config_to(config, &path)
}

/// Save configuration to an explicit file, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("MBOXFROM_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("mboxfrom").join("config.toml"))
}
