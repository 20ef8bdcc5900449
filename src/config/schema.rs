use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::{ScoringConfig, ValidationPolicy};
use crate::tui::Theme;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name rows are saved and ranked under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Reject or clamp out-of-range form values
    #[serde(default)]
    pub validation: ValidationPolicy,

    #[serde(default)]
    pub theme: Theme,

    /// Formula constants; omitted means canonical defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringConfig>,

    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Local,
    Remote,
    Disabled,
}

/// Where saved results go.
///
/// Example YAML:
/// ```yaml
/// history:
///   backend: remote
///   endpoint: https://sheets.example.com/exec
///   timeout: 10s
///   max_retries: 3
///   token_env: SUNAN_RADAR_STORE_TOKEN
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,

    /// Local JSON file (default ~/.config/sunan-radar/history.json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Remote endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Per-request timeout, humantime format (default "10s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Retries after the first attempt (default 3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<usize>,

    /// Environment variable holding a bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}
