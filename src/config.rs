//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::models::checkin::CheckInKind;
use crate::{AppError, Result};

/// Nested Slack configuration for Socket Mode connectivity.
///
/// Tokens are loaded at runtime via OS keychain or environment
/// variables, not from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// The single Slack user the bot prompts and listens to.
    pub authorized_user_id: String,
    /// App-level token used for Socket Mode (populated at runtime).
    #[serde(skip)]
    pub app_token: String,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

/// Note-service connection settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct NoteConfig {
    /// Base URL of the Craft daily-note API.
    pub base_url: String,
    /// Request timeout for block writes, in seconds.
    #[serde(default = "default_note_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_note_timeout_seconds() -> u64 {
    10
}

/// A wall-clock time of day parsed from `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    /// Hour of day, 0–23.
    pub hour: u8,
    /// Minute of hour, 0–59.
    pub minute: u8,
}

impl FromStr for TimeOfDay {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AppError::Config(format!("invalid time of day (expected HH:MM): {s}"));
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Daily trigger schedule in a configured IANA time zone.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ScheduleConfig {
    /// IANA zone name the trigger times are interpreted in.
    pub time_zone: Tz,
    /// Morning check-in trigger time.
    #[serde(default = "default_morning_time")]
    pub morning: TimeOfDay,
    /// Evening check-in trigger time.
    #[serde(default = "default_evening_time")]
    pub evening: TimeOfDay,
    /// Hours before an unanswered check-in slot is expired at the next
    /// trigger. `0` disables expiry: the slot stays open until a reply
    /// succeeds.
    #[serde(default)]
    pub slot_expiry_hours: u32,
}

fn default_morning_time() -> TimeOfDay {
    TimeOfDay { hour: 7, minute: 0 }
}

fn default_evening_time() -> TimeOfDay {
    TimeOfDay {
        hour: 17,
        minute: 30,
    }
}

impl ScheduleConfig {
    /// Trigger time for the given check-in kind.
    #[must_use]
    pub fn time_for(&self, kind: CheckInKind) -> TimeOfDay {
        match kind {
            CheckInKind::Morning => self.morning,
            CheckInKind::Evening => self.evening,
        }
    }

    /// Maximum age of an open slot before it is expired, or `None`
    /// when expiry is disabled.
    #[must_use]
    pub fn slot_expiry(&self) -> Option<chrono::Duration> {
        (self.slot_expiry_hours > 0)
            .then(|| chrono::Duration::hours(i64::from(self.slot_expiry_hours)))
    }
}

/// Prompt texts sent for each check-in kind.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PromptConfig {
    /// Morning prompt text.
    #[serde(default = "default_morning_prompt")]
    pub morning: String,
    /// Evening prompt text.
    #[serde(default = "default_evening_prompt")]
    pub evening: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            morning: default_morning_prompt(),
            evening: default_evening_prompt(),
        }
    }
}

fn default_morning_prompt() -> String {
    "Good morning! \u{1f305}\n\nDid you complete your morning routine today?\n\nPlease share how it went!".into()
}

fn default_evening_prompt() -> String {
    "Evening check-in! \u{1f4aa}\n\nDid you get your exercise in today?\n\nLet me know how it went!".into()
}

impl PromptConfig {
    /// Prompt text for the given check-in kind.
    #[must_use]
    pub fn text_for(&self, kind: CheckInKind) -> &str {
        match kind {
            CheckInKind::Morning => &self.morning,
            CheckInKind::Evening => &self.evening,
        }
    }
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Slack connectivity settings.
    pub slack: SlackConfig,
    /// Note-service connection settings.
    pub note: NoteConfig,
    /// Daily check-in schedule.
    pub schedule: ScheduleConfig,
    /// Prompt texts.
    #[serde(default)]
    pub prompts: PromptConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or
    /// contains invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load Slack credentials from OS keychain with env-var fallback.
    ///
    /// Tries the `habit-coach` keyring service first, then falls back
    /// to `SLACK_APP_TOKEN` / `SLACK_BOT_TOKEN` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor env vars
    /// provide the required tokens.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.app_token = load_credential("slack_app_token", "SLACK_APP_TOKEN").await?;
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.slack.authorized_user_id.trim().is_empty() {
            return Err(AppError::Config(
                "slack.authorized_user_id must not be empty".into(),
            ));
        }

        if !self.note.base_url.starts_with("http://") && !self.note.base_url.starts_with("https://")
        {
            return Err(AppError::Config(
                "note.base_url must be an http(s) URL".into(),
            ));
        }

        if self.note.timeout_seconds == 0 {
            return Err(AppError::Config(
                "note.timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.schedule.morning == self.schedule.evening {
            return Err(AppError::Config(
                "schedule.morning and schedule.evening must differ".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O, so it runs on the blocking pool.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new("habit-coach", &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
