pub mod init;
mod schema;

pub use schema::{Config, HistoryBackend, HistoryConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history::check_display_name;
use crate::scoring::{validate_scoring, ScoringConfig};

pub const DEFAULT_TIMEOUT: &str = "10s";
pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_TOKEN_ENV: &str = "SUNAN_RADAR_STORE_TOKEN";

/// Get the config directory path (~/.config/sunan-radar/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("sunan-radar")
}

/// Get the default config file path (~/.config/sunan-radar/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory at {}", config_dir.display())
        })?;
    }
    Ok(())
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/sunan-radar/config.yaml), falling back to built-in defaults
///   when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {} (passed with --config)", p.display());
            }
            p
        }
        None => {
            let default_path = get_config_path();
            if !default_path.exists() {
                return Ok(Config::default());
            }
            default_path
        }
    };

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))
}

pub fn parse_config(yaml: &str) -> Result<Config> {
    // A file holding only comments has no document to deserialize
    let has_content = yaml.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    });
    if !has_content {
        return Ok(Config::default());
    }
    let config: Config = serde_saphyr::from_str(yaml)?;
    Ok(config)
}

/// Validate the whole config. Returns all errors at once.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(scoring_errors) = validate_scoring(&config.effective_scoring()) {
        errors.extend(scoring_errors);
    }

    if let Some(ref name) = config.display_name {
        if let Err(e) = check_display_name(name) {
            errors.push(format!("display_name: {}", e));
        }
    }

    let history = &config.history;
    if let Some(ref timeout) = history.timeout {
        if let Err(e) = humantime::parse_duration(timeout) {
            errors.push(format!("history.timeout: invalid '{}' - {}", timeout, e));
        }
    }
    if history.backend == HistoryBackend::Remote {
        match history.endpoint.as_deref() {
            None => errors.push("history.endpoint: required for the remote backend".to_string()),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                errors.push(format!("history.endpoint: '{}' is not an http(s) URL", url))
            }
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Config {
    pub fn effective_scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    /// Display name from the config, trimmed; None if unset or blank.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

impl HistoryConfig {
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(p) => expand_home(p),
            None => crate::history::default_history_path(),
        }
    }

    pub fn timeout(&self) -> Result<Duration> {
        let raw = self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        humantime::parse_duration(raw).with_context(|| format!("Invalid history.timeout '{}'", raw))
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Bearer token from the configured environment variable, if set and non-empty.
    pub fn token(&self) -> Option<String> {
        let var = self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
