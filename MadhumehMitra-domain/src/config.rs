//! Application configuration read from the environment

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::ai::GeminiConfig;
use crate::auth::AuthConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: String, value: String },

    #[error("{0} must be greater than zero")]
    Zero(String),
}

/// Reminder cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderConfig {
    pub poll_interval: Duration,
    pub water_interval: Duration,
    pub activity_interval: Duration,
}

/// Everything the app needs besides the database location
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ai: GeminiConfig,
    pub auth: AuthConfig,
    pub reminders: ReminderConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        info!(
            "Configuration loaded: ai={}, auth={}, water every {}m, activity every {}m",
            if config.ai.has_credentials() { "enabled" } else { "disabled" },
            if config.auth.is_configured() { "configured" } else { "guest" },
            config.reminders.water_interval.as_secs() / 60,
            config.reminders.activity_interval.as_secs() / 60,
        );
        Ok(config)
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let ai = GeminiConfig {
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(positive(&lookup, "AI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
        };

        let auth = AuthConfig {
            publishable_key: non_empty("AUTH_PUBLISHABLE_KEY"),
            user_id: non_empty("AUTH_USER_ID"),
        };

        let reminders = ReminderConfig {
            poll_interval: Duration::from_secs(positive(&lookup, "REMINDER_POLL_SECS", 60)?),
            water_interval: Duration::from_secs(positive(&lookup, "WATER_REMINDER_MINUTES", 90)? * 60),
            activity_interval: Duration::from_secs(positive(&lookup, "ACTIVITY_REMINDER_MINUTES", 120)? * 60),
        };

        Ok(Self { ai, auth, reminders })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn positive<F>(lookup: &F, name: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, name, default)? {
        0 => Err(ConfigError::Zero(name.to_string())),
        value => Ok(value),
    }
}
