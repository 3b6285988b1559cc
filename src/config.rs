use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::issues::Severity;

pub const CONFIG_FILE_NAME: &str = ".ngi18nrc.json";

/// Pattern used by the id-pattern validator when none (or an invalid one) is set.
pub const ACCEPT_ANY_PATTERN: &str = ".*";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default)]
    pub validators: ValidatorConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

fn default_ignores() -> Vec<String> {
    vec!["**/dist/**".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            validators: ValidatorConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// Enabled flag and severity of one validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorToggle {
    pub enabled: bool,
    pub level: Severity,
}

impl ValidatorToggle {
    pub const fn new(enabled: bool, level: Severity) -> Self {
        Self { enabled, level }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternToggle {
    pub enabled: bool,
    pub level: Severity,
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_pattern() -> String {
    ACCEPT_ANY_PATTERN.to_string()
}

/// Which validators run and at what severity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorConfig {
    #[serde(default = "default_duplicate_values")]
    pub duplicate_values: ValidatorToggle,
    #[serde(default = "default_id_must_match_regex")]
    pub id_must_match_regex: PatternToggle,
    #[serde(default = "default_warn_for_html_tags")]
    pub warn_for_html_tags: ValidatorToggle,
    #[serde(default = "default_mismatching_values")]
    pub mismatching_values: ValidatorToggle,
    #[serde(default = "default_warn_for_interpolations")]
    pub warn_for_interpolations: ValidatorToggle,
}

fn default_duplicate_values() -> ValidatorToggle {
    ValidatorToggle::new(true, Severity::Warning)
}

fn default_id_must_match_regex() -> PatternToggle {
    PatternToggle {
        enabled: false,
        level: Severity::Warning,
        pattern: default_pattern(),
    }
}

fn default_warn_for_html_tags() -> ValidatorToggle {
    ValidatorToggle::new(true, Severity::Warning)
}

fn default_mismatching_values() -> ValidatorToggle {
    ValidatorToggle::new(true, Severity::Error)
}

fn default_warn_for_interpolations() -> ValidatorToggle {
    ValidatorToggle::new(false, Severity::Warning)
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            duplicate_values: default_duplicate_values(),
            id_must_match_regex: default_id_must_match_regex(),
            warn_for_html_tags: default_warn_for_html_tags(),
            mismatching_values: default_mismatching_values(),
            warn_for_interpolations: default_warn_for_interpolations(),
        }
    }
}

/// Preferences for the combined warning/error notification in watch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
    /// Lowest severity that counts towards notifications.
    #[serde(default = "default_minimum_level")]
    pub minimum_level: Severity,
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_minimum_level() -> Severity {
    Severity::Warning
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            minimum_level: default_minimum_level(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob patterns in `ignores` or `includes` are invalid.
    /// An invalid id pattern is not an error: the validator falls back to accepting any id.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Path of the file the config came from; `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let config = read_config_file(&path)?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config.validate()?;
    Ok(config)
}

/// Live configuration.
///
/// Validator and notification settings are published on separate channels so
/// a notification-only edit does not re-run validation.
pub struct ConfigSource {
    validators: watch::Sender<Arc<ValidatorConfig>>,
    notifications: watch::Sender<Arc<NotificationConfig>>,
}

impl ConfigSource {
    pub fn new(config: &Config) -> Self {
        Self {
            validators: watch::Sender::new(Arc::new(config.validators.clone())),
            notifications: watch::Sender::new(Arc::new(config.notifications)),
        }
    }

    /// Publish new settings. Subscribers are only woken for parts that changed.
    pub fn update(&self, config: &Config) {
        let validators_changed = self.validators.send_if_modified(|current| {
            if **current == config.validators {
                return false;
            }
            *current = Arc::new(config.validators.clone());
            true
        });
        let notifications_changed = self.notifications.send_if_modified(|current| {
            if **current == config.notifications {
                return false;
            }
            *current = Arc::new(config.notifications);
            true
        });
        tracing::debug!(validators_changed, notifications_changed, "configuration updated");
    }

    pub fn validators(&self) -> Arc<ValidatorConfig> {
        self.validators.borrow().clone()
    }

    pub fn notifications(&self) -> Arc<NotificationConfig> {
        self.notifications.borrow().clone()
    }

    pub fn subscribe_validators(&self) -> watch::Receiver<Arc<ValidatorConfig>> {
        self.validators.subscribe()
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<Arc<NotificationConfig>> {
        self.notifications.subscribe()
    }
}
