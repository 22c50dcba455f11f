mod feeds;
mod observability;
mod store;
mod telegram;

pub use feeds::*;
pub use observability::*;
pub use store::*;
pub use telegram::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between the start of two consecutive ticks.
    #[serde(default = "d_interval_secs")]
    pub interval_secs: u64,
    /// No feed posts before this hour (UTC), 0–23.
    #[serde(default = "d_posting_start_hour")]
    pub posting_start_hour: u32,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: d_interval_secs(),
            posting_start_hour: d_posting_start_hour(),
            telegram: TelegramConfig::default(),
            store: StoreConfig::default(),
            feeds: FeedsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn d_interval_secs() -> u64 {
    600
}

fn d_posting_start_hour() -> u32 {
    4
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.posting_start_hour > 23 {
            errors.push(ConfigError::error(
                "posting_start_hour",
                format!(
                    "invalid hour {} (must be between 0 and 23)",
                    self.posting_start_hour
                ),
            ));
        }

        if self.interval_secs == 0 {
            errors.push(ConfigError::error(
                "interval_secs",
                "interval must be greater than 0",
            ));
        }

        if self.telegram.resolve_token().is_none() {
            errors.push(ConfigError::error(
                "telegram.token",
                format!(
                    "no bot token (set ${} or telegram.token)",
                    self.telegram.token_env
                ),
            ));
        }

        if self.telegram.log_chat_id.is_empty() {
            errors.push(ConfigError::warning(
                "telegram.log_chat_id",
                "no operator chat; errors are only written to the log",
            ));
        }

        if !self.observability.sample_rate_in_range() {
            errors.push(ConfigError::error(
                "observability.sample_rate",
                format!(
                    "sample rate {} is outside 0.0..=1.0",
                    self.observability.sample_rate
                ),
            ));
        }

        self.validate_store(&mut errors);
        self.validate_feeds(&mut errors);

        errors
    }

    /// `true` when no issue of `Error` severity is present.
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|e| e.severity != ConfigSeverity::Error)
    }

    fn validate_store(&self, errors: &mut Vec<ConfigError>) {
        match self.store.backend {
            StoreBackend::Kv => {
                let kv = &self.store.kv;
                if kv.account_id.is_empty() {
                    errors.push(ConfigError::error(
                        "store.kv.account_id",
                        "account_id must not be empty for the kv backend",
                    ));
                }
                if kv.namespace_id.is_empty() {
                    errors.push(ConfigError::error(
                        "store.kv.namespace_id",
                        "namespace_id must not be empty for the kv backend",
                    ));
                }
                if kv.resolve_token().is_none() {
                    errors.push(ConfigError::error(
                        "store.kv.token_env",
                        format!("${} is not set", kv.token_env),
                    ));
                }
            }
            StoreBackend::Yaml => {
                if self.store.yaml_path.as_os_str().is_empty() {
                    errors.push(ConfigError::error(
                        "store.yaml_path",
                        "yaml_path must not be empty for the yaml backend",
                    ));
                }
            }
            StoreBackend::Memory => {
                errors.push(ConfigError::warning(
                    "store.backend",
                    "memory backend keeps cursors only until the process exits",
                ));
            }
        }
    }

    fn validate_feeds(&self, errors: &mut Vec<ConfigError>) {
        let moon = &self.feeds.moon_phase;
        if moon.enabled && moon.chat_id.is_empty() && self.telegram.log_chat_id.is_empty() {
            errors.push(ConfigError::error(
                "feeds.moon_phase.chat_id",
                "chat_id must not be empty when the feed is enabled",
            ));
        }

        let book = &self.feeds.book_of_days;
        if book.path.is_some() {
            if book.chat_id.is_empty() {
                errors.push(ConfigError::error(
                    "feeds.book_of_days.chat_id",
                    "chat_id must not be empty when path is set",
                ));
            }
            if book.pattern_template.is_empty() {
                errors.push(ConfigError::error(
                    "feeds.book_of_days.pattern_template",
                    "pattern_template must not be empty when path is set",
                ));
            } else {
                let sample = book.pattern_template.replace("monthday", "January 1");
                if let Err(e) = regex::Regex::new(&sample) {
                    errors.push(ConfigError::error(
                        "feeds.book_of_days.pattern_template",
                        format!("invalid regex: {e}"),
                    ));
                }
            }
        }

        let lesson = &self.feeds.lesson;
        if lesson.path.is_some() && lesson.chat_id.is_empty() {
            errors.push(ConfigError::error(
                "feeds.lesson.chat_id",
                "chat_id must not be empty when path is set",
            ));
        }
        if let Some(pattern) = &lesson.terminal_pattern {
            if let Err(e) = regex::Regex::new(pattern) {
                errors.push(ConfigError::error(
                    "feeds.lesson.terminal_pattern",
                    format!("invalid regex `{pattern}`: {e}"),
                ));
            }
        }
        // Feb 29 is rejected: the epoch has to exist in every year.
        if chrono::NaiveDate::from_ymd_opt(2023, lesson.epoch_month, lesson.epoch_day).is_none() {
            errors.push(ConfigError::error(
                "feeds.lesson.epoch_month",
                format!(
                    "{}/{} is not a calendar date in every year",
                    lesson.epoch_month, lesson.epoch_day
                ),
            ));
        }
        if lesson.max_len == 0 {
            errors.push(ConfigError::error(
                "feeds.lesson.max_len",
                "max_len must be greater than 0",
            ));
        }
    }
}
