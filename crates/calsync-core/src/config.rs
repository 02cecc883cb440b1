//! TOML-based application configuration.
//!
//! Stores:
//! - Notion token and the three source database ids
//! - Google OAuth client credentials and refresh tokens (personal + work)
//! - Destination calendar ids
//! - Time zone for wall-clock times and the HTTP timeout
//!
//! Configuration is stored at `~/.config/calsync/config.toml`. Environment
//! variables (also read from a `.env` file) override file values, and
//! secrets left empty after that are looked up in the OS keyring.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, IntegrationError};
use crate::format::CalendarSelector;
use crate::integrations::keyring_store;
use crate::records::TimeZoneSetting;
use crate::sync::SyncTarget;

const REDACTED: &str = "********";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub activity_database_id: String,
    #[serde(default)]
    pub exercise_database_id: String,
    #[serde(default)]
    pub sleep_database_id: String,
    #[serde(default = "default_notion_api_base")]
    pub api_base: String,
}

/// OAuth client plus the refresh token for one Google account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleAccountConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl GoogleAccountConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.refresh_token.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_google_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default)]
    pub personal: GoogleAccountConfig,
    #[serde(default)]
    pub work: GoogleAccountConfig,
}

/// Destination calendar ids, one per selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarsConfig {
    #[serde(default)]
    pub personal_activity: String,
    #[serde(default)]
    pub work_activity: String,
    #[serde(default)]
    pub fitness: String,
    #[serde(default)]
    pub normal_wake_up: String,
    #[serde(default)]
    pub sleep_in: String,
}

impl CalendarsConfig {
    pub fn id_for(&self, selector: CalendarSelector) -> &str {
        match selector {
            CalendarSelector::PersonalActivity => &self.personal_activity,
            CalendarSelector::WorkActivity => &self.work_activity,
            CalendarSelector::Fitness => &self.fitness,
            CalendarSelector::NormalWakeUp => &self.normal_wake_up,
            CalendarSelector::SleepIn => &self.sleep_in,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/calsync/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// IANA zone name; the system zone is used when unset.
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub calendars: CalendarsConfig,
}

// Default functions
fn default_notion_api_base() -> String {
    "https://api.notion.com/v1".into()
}
fn default_google_api_base() -> String {
    "https://www.googleapis.com/calendar/v3".into()
}
fn default_token_url() -> String {
    crate::integrations::oauth::GOOGLE_TOKEN_URL.into()
}
fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            activity_database_id: String::new(),
            exercise_database_id: String::new(),
            sleep_database_id: String::new(),
            api_base: default_notion_api_base(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_base: default_google_api_base(),
            token_url: default_token_url(),
            personal: GoogleAccountConfig::default(),
            work: GoogleAccountConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_zone: None,
            http_timeout_secs: default_http_timeout_secs(),
            notion: NotionConfig::default(),
            google: GoogleConfig::default(),
            calendars: CalendarsConfig::default(),
        }
    }
}

/// Secrets that may live in the OS keyring instead of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretKey {
    NotionToken,
    PersonalClientSecret,
    PersonalRefreshToken,
    WorkClientSecret,
    WorkRefreshToken,
}

impl SecretKey {
    pub const ALL: [SecretKey; 5] = [
        SecretKey::NotionToken,
        SecretKey::PersonalClientSecret,
        SecretKey::PersonalRefreshToken,
        SecretKey::WorkClientSecret,
        SecretKey::WorkRefreshToken,
    ];

    /// Keyring entry name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretKey::NotionToken => "notion_token",
            SecretKey::PersonalClientSecret => "google_personal_client_secret",
            SecretKey::PersonalRefreshToken => "google_personal_refresh_token",
            SecretKey::WorkClientSecret => "google_work_client_secret",
            SecretKey::WorkRefreshToken => "google_work_refresh_token",
        }
    }
}

/// Environment variables that override config fields.
pub const ENV_VARS: [&str; 15] = [
    "NOTION_TOKEN",
    "NOTION_PRS_DATABASE_ID",
    "NOTION_WORKOUTS_DATABASE_ID",
    "NOTION_SLEEP_DATABASE_ID",
    "PERSONAL_GOOGLE_CLIENT_ID",
    "PERSONAL_GOOGLE_CLIENT_SECRET",
    "PERSONAL_GOOGLE_REFRESH_TOKEN",
    "WORK_GOOGLE_CLIENT_ID",
    "WORK_GOOGLE_CLIENT_SECRET",
    "WORK_GOOGLE_REFRESH_TOKEN",
    "PRS_PERSONAL_CALENDAR_ID",
    "PRS_WORK_CALENDAR_ID",
    "FITNESS_CALENDAR_ID",
    "NORMAL_WAKE_UP_CALENDAR_ID",
    "SLEEP_IN_CALENDAR_ID",
];

impl Config {
    /// Load from the default path; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))
    }

    /// File values, then `.env` and process environment, then keyring.
    pub fn load_resolved() -> Result<Self, ConfigError> {
        let mut config = Self::load()?;
        env_file_loaded(dotenvy::dotenv(), Path::new(".env"))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.fill_secrets_from_keyring()?;
        Ok(config)
    }

    /// Override fields from non-empty variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in ENV_VARS {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                if let Some(slot) = self.env_slot(name) {
                    *slot = value.trim().to_string();
                }
            }
        }
        if let Some(zone) = lookup("CALSYNC_TIME_ZONE").filter(|v| !v.trim().is_empty()) {
            self.time_zone = Some(zone.trim().to_string());
        }
    }

    fn env_slot(&mut self, name: &str) -> Option<&mut String> {
        let slot = match name {
            "NOTION_TOKEN" => &mut self.notion.token,
            "NOTION_PRS_DATABASE_ID" => &mut self.notion.activity_database_id,
            "NOTION_WORKOUTS_DATABASE_ID" => &mut self.notion.exercise_database_id,
            "NOTION_SLEEP_DATABASE_ID" => &mut self.notion.sleep_database_id,
            "PERSONAL_GOOGLE_CLIENT_ID" => &mut self.google.personal.client_id,
            "PERSONAL_GOOGLE_CLIENT_SECRET" => &mut self.google.personal.client_secret,
            "PERSONAL_GOOGLE_REFRESH_TOKEN" => &mut self.google.personal.refresh_token,
            "WORK_GOOGLE_CLIENT_ID" => &mut self.google.work.client_id,
            "WORK_GOOGLE_CLIENT_SECRET" => &mut self.google.work.client_secret,
            "WORK_GOOGLE_REFRESH_TOKEN" => &mut self.google.work.refresh_token,
            "PRS_PERSONAL_CALENDAR_ID" => &mut self.calendars.personal_activity,
            "PRS_WORK_CALENDAR_ID" => &mut self.calendars.work_activity,
            "FITNESS_CALENDAR_ID" => &mut self.calendars.fitness,
            "NORMAL_WAKE_UP_CALENDAR_ID" => &mut self.calendars.normal_wake_up,
            "SLEEP_IN_CALENDAR_ID" => &mut self.calendars.sleep_in,
            _ => return None,
        };
        Some(slot)
    }

    pub fn secret_mut(&mut self, key: SecretKey) -> &mut String {
        match key {
            SecretKey::NotionToken => &mut self.notion.token,
            SecretKey::PersonalClientSecret => &mut self.google.personal.client_secret,
            SecretKey::PersonalRefreshToken => &mut self.google.personal.refresh_token,
            SecretKey::WorkClientSecret => &mut self.google.work.client_secret,
            SecretKey::WorkRefreshToken => &mut self.google.work.refresh_token,
        }
    }

    fn fill_secrets_from_keyring(&mut self) -> Result<(), ConfigError> {
        for key in SecretKey::ALL {
            let slot = self.secret_mut(key);
            if !slot.is_empty() {
                continue;
            }
            match keyring_store::get(key.as_str()) {
                Ok(Some(value)) => *slot = value,
                Ok(None) => {}
                // No secret service on this machine; fall through to validation.
                Err(e) => tracing::debug!(key = key.as_str(), error = %e, "keyring lookup failed"),
            }
        }
        Ok(())
    }

    pub fn time_zone(&self) -> Result<TimeZoneSetting, ConfigError> {
        match &self.time_zone {
            None => Ok(TimeZoneSetting::Local),
            Some(name) => name.parse().map_err(|message| ConfigError::InvalidValue {
                key: "time_zone".to_string(),
                message,
            }),
        }
    }

    /// Shared HTTP client honoring `http_timeout_secs`.
    pub fn http_client(&self) -> Result<reqwest::Client, IntegrationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .user_agent(concat!("calsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }

    /// Check that every setting needed by `targets` is present.
    pub fn validate_for(&self, targets: &[SyncTarget]) -> Result<(), ConfigError> {
        self.time_zone()?;
        require(&self.notion.token, "notion.token (NOTION_TOKEN)")?;

        for target in targets {
            match target {
                SyncTarget::PersonalActivity => {
                    require(
                        &self.notion.activity_database_id,
                        "notion.activity_database_id (NOTION_PRS_DATABASE_ID)",
                    )?;
                    require_account(&self.google.personal, "personal", "PERSONAL")?;
                    require(
                        &self.calendars.personal_activity,
                        "calendars.personal_activity (PRS_PERSONAL_CALENDAR_ID)",
                    )?;
                }
                SyncTarget::WorkActivity => {
                    require(
                        &self.notion.activity_database_id,
                        "notion.activity_database_id (NOTION_PRS_DATABASE_ID)",
                    )?;
                    require_account(&self.google.work, "work", "WORK")?;
                    require(
                        &self.calendars.work_activity,
                        "calendars.work_activity (PRS_WORK_CALENDAR_ID)",
                    )?;
                }
                SyncTarget::Exercise => {
                    require(
                        &self.notion.exercise_database_id,
                        "notion.exercise_database_id (NOTION_WORKOUTS_DATABASE_ID)",
                    )?;
                    require_account(&self.google.personal, "personal", "PERSONAL")?;
                    require(
                        &self.calendars.fitness,
                        "calendars.fitness (FITNESS_CALENDAR_ID)",
                    )?;
                }
                SyncTarget::Sleep => {
                    require(
                        &self.notion.sleep_database_id,
                        "notion.sleep_database_id (NOTION_SLEEP_DATABASE_ID)",
                    )?;
                    require_account(&self.google.personal, "personal", "PERSONAL")?;
                    require(
                        &self.calendars.normal_wake_up,
                        "calendars.normal_wake_up (NORMAL_WAKE_UP_CALENDAR_ID)",
                    )?;
                    require(
                        &self.calendars.sleep_in,
                        "calendars.sleep_in (SLEEP_IN_CALENDAR_ID)",
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Copy with every non-empty secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for key in SecretKey::ALL {
            let slot = copy.secret_mut(key);
            if !slot.is_empty() {
                *slot = REDACTED.to_string();
            }
        }
        copy
    }
}

fn require(value: &str, key: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingKey(key.to_string()));
    }
    Ok(())
}

fn require_account(
    account: &GoogleAccountConfig,
    section: &str,
    env_prefix: &str,
) -> Result<(), ConfigError> {
    require(
        &account.client_id,
        &format!("google.{section}.client_id ({env_prefix}_GOOGLE_CLIENT_ID)"),
    )?;
    require(
        &account.client_secret,
        &format!("google.{section}.client_secret ({env_prefix}_GOOGLE_CLIENT_SECRET)"),
    )?;
    require(
        &account.refresh_token,
        &format!("google.{section}.refresh_token ({env_prefix}_GOOGLE_REFRESH_TOKEN)"),
    )
}

/// A missing `.env` file is normal; an unreadable or malformed one is not.
fn env_file_loaded<T>(result: Result<T, dotenvy::Error>, path: &Path) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Returns `~/.config/calsync[-dev]/` based on CALSYNC_ENV.
///
/// Set CALSYNC_ENV=dev to use development config directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CALSYNC_ENV").unwrap_or_else(|_| "production".to_string());
    let dir = if env == "dev" {
        base_dir.join("calsync-dev")
    } else {
        base_dir.join("calsync")
    };
    Ok(dir)
}

/// Config file path: `CALSYNC_CONFIG` if set, else `config_dir()/config.toml`.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("CALSYNC_CONFIG") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    Ok(config_dir()?.join("config.toml"))
}
