//! Application configuration for Despachos.
//!
//! User config lives at `~/.despachos/despachos.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DespachosError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "despachos.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".despachos";

// ---------------------------------------------------------------------------
// Config structs (matching despachos.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory API and profile page settings.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[directory]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Personnel query endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Organizational unit code (`UNIDADES`).
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Affiliation codes (`FILIACION`), sent joined with `|`.
    #[serde(default = "default_affiliations")]
    pub affiliations: Vec<String>,

    /// Maximum number of people the API should return.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Profile search page; the email is passed as the `search` parameter.
    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            unit: default_unit(),
            affiliations: default_affiliations(),
            limit: default_limit(),
            profile_url: default_profile_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://telematica.um.es/fichas/api/query/users/".into()
}
fn default_unit() -> String {
    "a002b031".into()
}
fn default_affiliations() -> Vec<String> {
    vec!["a004".into(), "a007".into()]
}
fn default_limit() -> u32 {
    200
}
fn default_profile_url() -> String {
    "https://www.um.es/atica/directorio/".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path prefix for the generated `.txt`, `.md` and `.csv` files.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "despachos".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.despachos/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DespachosError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.despachos/despachos.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| DespachosError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DespachosError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DespachosError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = to_toml(&AppConfig::default())?;

    std::fs::write(&path, content).map_err(|e| DespachosError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Render a config as pretty TOML.
pub fn to_toml(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| DespachosError::config(e.to_string()))
}

/// Reject values the pipeline cannot work with.
pub fn validate(config: &AppConfig) -> Result<()> {
    if config.directory.api_url.trim().is_empty() {
        return Err(DespachosError::config("directory.api_url must not be empty"));
    }
    if config.directory.profile_url.trim().is_empty() {
        return Err(DespachosError::config(
            "directory.profile_url must not be empty",
        ));
    }
    if config.output.prefix.trim().is_empty() {
        return Err(DespachosError::config("output.prefix must not be empty"));
    }
    Ok(())
}
