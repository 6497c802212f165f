//! Bot settings and validation.
//!
//! Settings come from the process environment (optionally seeded from a
//! `.env` file by the composition root). Unparseable values fall back to the
//! default with a warning; out-of-range values are rejected by
//! [`validate_settings`].

use std::path::PathBuf;
use std::time::Duration;

/// Capacity of each guild's task queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Language used when a user has not chosen one.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Upper bound on the queue capacity setting.
pub const MAX_QUEUE_CAPACITY: usize = 1024;

/// Runtime settings for the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    /// Language tag used when the author has no stored preference.
    pub default_language: String,
    /// Bounded queue capacity per guild worker.
    pub queue_capacity: usize,
    /// Pause inserted after every executed task (playback throttle).
    pub task_pause: Duration,
    /// Period between idle-reaper sweeps.
    pub reaper_interval: Duration,
    /// Delay before each per-guild check within a sweep.
    pub reaper_guild_delay: Duration,
    /// Minimum delay before the reaper is restarted after a fault.
    pub reaper_restart_delay: Duration,
    /// Maximum number of characters read aloud per message.
    pub max_tts_chars: usize,
    /// Location of the preference database file.
    pub database_path: PathBuf,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BotSettings {
    /// Create settings with the stock defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            task_pause: Duration::from_millis(100),
            reaper_interval: Duration::from_secs(10),
            reaper_guild_delay: Duration::from_secs(1),
            reaper_restart_delay: Duration::from_secs(1),
            max_tts_chars: 50,
            database_path: PathBuf::from("db-data/app.db"),
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// Missing or empty keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::with_defaults();

        if let Some(lang) = get("DEFAULT_TTS_LANG") {
            settings.default_language = lang.trim().to_string();
        }
        if let Some(n) = parse_number(&get, "YOMIAGE_QUEUE_CAPACITY") {
            settings.queue_capacity = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(ms) = parse_number(&get, "YOMIAGE_TASK_PAUSE_MS") {
            settings.task_pause = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_number(&get, "YOMIAGE_REAPER_INTERVAL_SECS") {
            settings.reaper_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_number(&get, "YOMIAGE_REAPER_GUILD_DELAY_MS") {
            settings.reaper_guild_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_number(&get, "YOMIAGE_REAPER_RESTART_DELAY_MS") {
            settings.reaper_restart_delay = Duration::from_millis(ms);
        }
        if let Some(n) = parse_number(&get, "YOMIAGE_MAX_TTS_CHARS") {
            settings.max_tts_chars = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(path) = get("YOMIAGE_DATABASE_PATH") {
            settings.database_path = PathBuf::from(path);
        }

        settings
    }
}

fn parse_number<G>(get: &G, key: &str) -> Option<u64>
where
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.trim().parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring unparseable setting");
            None
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Queue capacity must be between 1 and {MAX_QUEUE_CAPACITY}, got {0}")]
    InvalidQueueCapacity(usize),

    #[error("Reaper interval must be at least one second, got {0:?}")]
    InvalidReaperInterval(Duration),

    #[error("Maximum characters per message must be at least 1")]
    InvalidMaxChars,

    #[error("Default language must not be empty")]
    EmptyDefaultLanguage,
}

/// Validate settings before they are used to build workers.
pub fn validate_settings(settings: &BotSettings) -> Result<(), SettingsError> {
    if settings.queue_capacity == 0 || settings.queue_capacity > MAX_QUEUE_CAPACITY {
        return Err(SettingsError::InvalidQueueCapacity(settings.queue_capacity));
    }
    if settings.reaper_interval < Duration::from_secs(1) {
        return Err(SettingsError::InvalidReaperInterval(settings.reaper_interval));
    }
    if settings.max_tts_chars == 0 {
        return Err(SettingsError::InvalidMaxChars);
    }
    if settings.default_language.trim().is_empty() {
        return Err(SettingsError::EmptyDefaultLanguage);
    }
    Ok(())
}
