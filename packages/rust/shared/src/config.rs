//! Application configuration for wikiloot.
//!
//! User config lives at `~/.wikiloot/wikiloot.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WikilootError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wikiloot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wikiloot";

// ---------------------------------------------------------------------------
// Config structs (matching wikiloot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputSection,

    /// Extraction settings.
    #[serde(default)]
    pub parse: ParseSection,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}
fn default_user_agent() -> String {
    concat!("wikiloot/", env!("CARGO_PKG_VERSION")).into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// File name of the error table, placed next to the output table.
    #[serde(default = "default_errors_file")]
    pub errors_file: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            errors_file: default_errors_file(),
        }
    }
}

fn default_errors_file() -> String {
    "errors_file.csv".into()
}

/// `[parse]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseSection {
    /// Treat a missing description block as an empty, valid description.
    #[serde(default)]
    pub allow_empty_description: bool,
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            user_agent: config.fetch.user_agent.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wikiloot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WikilootError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wikiloot/wikiloot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WikilootError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WikilootError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WikilootError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WikilootError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WikilootError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
