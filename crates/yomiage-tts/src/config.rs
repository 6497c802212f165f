//! Configuration for the Google TTS client.

use std::time::Duration;

use crate::error::{TtsClientError, TtsResult};

/// Google Cloud Text-to-Speech v1 synthesize endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Configuration for [`GoogleTtsClient`](crate::GoogleTtsClient).
///
/// # Example
///
/// ```
/// use yomiage_tts::GoogleTtsConfig;
/// use std::time::Duration;
///
/// let config = GoogleTtsConfig::new("api-key")
///     .with_timeout(Duration::from_secs(10))
///     .with_max_retries(1);
/// ```
#[derive(Debug, Clone)]
pub struct GoogleTtsConfig {
    pub(crate) endpoint: String,
    pub(crate) api_key: String,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
    /// Retries for 5xx and network errors.
    pub(crate) max_retries: u8,
    pub(crate) retry_base_delay: Duration,
}

impl GoogleTtsConfig {
    /// Configuration with default endpoint and timeouts.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            user_agent: concat!("yomiage-tts/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    /// Read `GOOGLE_TTS_API_KEY` and the optional `GOOGLE_TTS_ENDPOINT`.
    pub fn from_env() -> TtsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> TtsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_TTS_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(TtsClientError::MissingApiKey)?;

        let mut config = Self::new(api_key.trim());
        if let Some(endpoint) = lookup("GOOGLE_TTS_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Defaults to 2 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
