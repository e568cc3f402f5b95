//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/widgetdom/widgetdom.toml`
//! 3. Explicit config file (e.g. `--config`)
//! 4. Environment variables: `WIDGETDOM_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::FocusPolicy;

/// Runtime settings for an [`App`](crate::application::App).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where focus goes when the focused widget is removed
    pub focus_policy: FocusPolicy,
    /// Focus the first focusable widget after a mount when nothing has focus
    pub auto_focus: bool,
    /// Buffer size of the lifecycle event channel
    pub event_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_policy: FocusPolicy::Previous,
            auto_focus: false,
            event_capacity: 4096,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub focus_policy: Option<FocusPolicy>,
    pub auto_focus: Option<bool>,
    pub event_capacity: Option<usize>,
}

/// Get the XDG config directory for widgetdom.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "widgetdom").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("widgetdom.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            focus_policy: overlay.focus_policy.unwrap_or(self.focus_policy),
            auto_focus: overlay.auto_focus.unwrap_or(self.auto_focus),
            event_capacity: overlay.event_capacity.unwrap_or(self.event_capacity),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist if given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|path| path.exists());
        Self::load_from(global.as_deref(), config_file, env_source())
    }

    /// Load settings from explicit layers.
    ///
    /// `global` and `config_file` must exist when given; `env` supplies the
    /// `WIDGETDOM_*` overrides.
    pub fn load_from(
        global: Option<&Path>,
        config_file: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global {
            debug!("loading global config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        if let Some(path) = config_file {
            debug!("loading config file: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current, env)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply WIDGETDOM_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("focus_policy") {
            settings.focus_policy = parse_focus_policy(&val)?;
        }
        if let Ok(val) = config.get_bool("auto_focus") {
            settings.auto_focus = val;
        }
        if let Ok(val) = config.get_int("event_capacity") {
            settings.event_capacity = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("event_capacity must be positive, got {}", val),
            })?;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.event_capacity == 0 {
            return Err(ApplicationError::Config {
                message: "event_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize to TOML for display.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

/// The process environment, `WIDGETDOM_` prefix.
pub fn env_source() -> Environment {
    Environment::with_prefix("WIDGETDOM")
        .prefix_separator("_")
        .separator("__")
}

fn parse_focus_policy(value: &str) -> Result<FocusPolicy, ApplicationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "previous" => Ok(FocusPolicy::Previous),
        "next" => Ok(FocusPolicy::Next),
        other => Err(ApplicationError::Config {
            message: format!("unknown focus_policy '{}' (expected previous|next)", other),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
