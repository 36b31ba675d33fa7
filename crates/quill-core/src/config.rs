//! Quill settings
//!
//! Defaults are overlaid by `~/.config/quill/config.toml` (or the file
//! named by `QUILL_CONFIG`), which is overlaid by `QUILL_*` variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Prefix of every override variable
const ENV_PREFIX: &str = "QUILL";

/// Default toast lifetime in milliseconds
const DEFAULT_TOAST_MS: u64 = 3000;

/// When a navigation that resolves to an already rendered route rebuilds
/// the view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerenderPolicy {
    /// Skip when the same route object matched with identical parameters.
    /// Query-string-only changes do not rebuild the view.
    #[default]
    Route,
    /// Skip only when both the path and the query string are unchanged
    Location,
}

impl std::str::FromStr for RerenderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "route" => Ok(Self::Route),
            "location" => Ok(Self::Location),
            other => Err(format!("unknown rerender policy '{}'", other)),
        }
    }
}

/// Settings shared by the CLI and the app shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Whether navigations may request animated view transitions
    #[serde(default = "default_true")]
    pub view_transitions: bool,

    /// Re-render skip rule used by the router
    #[serde(default)]
    pub rerender: RerenderPolicy,

    /// How long a notification stays visible
    #[serde(default = "default_toast_ms")]
    pub toast_timeout_ms: u64,

    /// Seed sample notes into an empty store
    #[serde(default = "default_true")]
    pub seed_samples: bool,

    /// Log file path (default: {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            view_transitions: true,
            rerender: RerenderPolicy::default(),
            toast_timeout_ms: DEFAULT_TOAST_MS,
            seed_samples: true,
            log_file: None,
        }
    }
}

impl Config {
    /// Settings from the default config file and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Settings from `path`, or defaults when it does not exist, with the
    /// environment applied on top; creates the data directory
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Parse settings from TOML text, then apply the environment
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// `QUILL_*` overrides; unparsable values are logged and skipped
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_VIEW_TRANSITIONS", ENV_PREFIX)) {
            self.view_transitions = parse_flag(&val);
        }

        if let Ok(val) = std::env::var(format!("{}_RERENDER", ENV_PREFIX)) {
            match val.parse() {
                Ok(policy) => self.rerender = policy,
                Err(e) => warn!("Ignoring {}_RERENDER: {}", ENV_PREFIX, e),
            }
        }

        if let Ok(val) = std::env::var(format!("{}_TOAST_MS", ENV_PREFIX)) {
            match val.parse() {
                Ok(ms) => self.toast_timeout_ms = ms,
                Err(e) => warn!("Ignoring {}_TOAST_MS: {}", ENV_PREFIX, e),
            }
        }
    }

    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Write the settings to the default config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// `QUILL_CONFIG`, else `{config_dir}/quill/config.toml`
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
            .join("config.toml")
    }

    /// Directory holding one record file per note
    pub fn notes_dir(&self) -> PathBuf {
        self.data_dir.join("notes")
    }

    /// Effective log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }

    /// Toast lifetime
    pub fn toast_timeout(&self) -> Duration {
        Duration::from_millis(self.toast_timeout_ms)
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

fn default_true() -> bool {
    true
}

fn default_toast_ms() -> u64 {
    DEFAULT_TOAST_MS
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quill")
}
