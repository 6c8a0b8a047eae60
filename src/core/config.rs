//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.llamachat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LlamaChatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub probe_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub input_max_lines: Option<u16>,
    pub render_markdown: Option<bool>,
    pub highlight_code: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8888";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_INPUT_MAX_LINES: u16 = 5;
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub probe_timeout: Duration,
    pub log_level: LevelFilter,
    pub input_max_lines: u16,
    pub render_markdown: bool,
    pub highlight_code: bool,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

/// Values taken from the environment. Read once in `main` so resolution
/// stays a pure function.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LLAMACHAT_BASE_URL").ok(),
            log_level: std::env::var("LOG_LEVEL").ok(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.llamachat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".llamachat").join("config.toml"))
}

/// Load config from `~/.llamachat/config.toml`.
pub fn load_config() -> Result<LlamaChatConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(LlamaChatConfig::default())
        }
    }
}

/// If the file doesn't exist, generates a commented-out default and
/// returns `LlamaChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<LlamaChatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(LlamaChatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: LlamaChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# llamachat configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "info"                 # Or set LOG_LEVEL; "off", "error", "warn", "info", "debug", "trace"

# [backend]
# base_url = "http://localhost:8888" # Or set LLAMACHAT_BASE_URL
# probe_timeout_secs = 10            # Connection test only; chat requests never time out

# [ui]
# input_max_lines = 5                # Input box grows up to this many lines, then scrolls
# render_markdown = true             # false = assistant replies shown as plain text
# highlight_code = true
"#;

fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.parse::<LevelFilter>() {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Ignoring unknown log level {:?}", value);
            None
        }
    }
}

/// Collapse defaults → config file → env → CLI into concrete values.
pub fn resolve(config: &LlamaChatConfig, env: &EnvOverrides, cli: &CliOverrides) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env.base_url.clone())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Log level: CLI → env → config → default, skipping unparseable values
    let log_level = [
        cli.log_level.as_deref(),
        env.log_level.as_deref(),
        config.general.log_level.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(parse_level)
    .unwrap_or(DEFAULT_LOG_LEVEL);

    let input_max_lines = config
        .ui
        .input_max_lines
        .unwrap_or(DEFAULT_INPUT_MAX_LINES)
        .max(1);

    ResolvedConfig {
        base_url,
        probe_timeout: Duration::from_secs(
            config
                .backend
                .probe_timeout_secs
                .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
        ),
        log_level,
        input_max_lines,
        render_markdown: config.ui.render_markdown.unwrap_or(true),
        highlight_code: config.ui.highlight_code.unwrap_or(true),
    }
}
