//! HTTP backend for the synthesize endpoint.
//!
//! The trait lets the client be tested without network access; the
//! production implementation uses reqwest with retries for transient errors.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::GoogleTtsConfig;
use crate::error::{TtsClientError, TtsResult};
use crate::models::{SynthesizeRequest, SynthesizeResponse};

/// Something that can answer a synthesize request.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    async fn synthesize(&self, request: &SynthesizeRequest) -> TtsResult<SynthesizeResponse>;
}

/// Production backend using reqwest.
///
/// Retries 5xx responses and network errors with exponential backoff;
/// 4xx responses fail immediately.
pub struct ReqwestBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    pub fn new(config: &GoogleTtsConfig) -> TtsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    async fn post_once(&self, request: &SynthesizeRequest) -> TtsResult<SynthesizeResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TtsClientError::ApiRequestFailed {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Longest wait between two attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// `base * 2^attempt`, capped at [`MAX_RETRY_DELAY`].
fn backoff_delay(base: Duration, attempt: u8) -> Duration {
    base.saturating_mul(2u32.saturating_pow(u32::from(attempt)))
        .min(MAX_RETRY_DELAY)
}

const fn is_retryable(err: &TtsClientError) -> bool {
    match err {
        TtsClientError::ApiRequestFailed { status, .. } => *status >= 500,
        TtsClientError::Network(_) => true,
        _ => false,
    }
}

#[async_trait]
impl SynthesisBackend for ReqwestBackend {
    async fn synthesize(&self, request: &SynthesizeRequest) -> TtsResult<SynthesizeResponse> {
        let mut attempt: u8 = 0;
        loop {
            match self.post_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    let delay = backoff_delay(self.retry_base_delay, attempt);
                    warn!(attempt, error = %e, delay = ?delay, "TTS request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(attempt, error = %e, "TTS request failed");
                    return Err(e);
                }
            }
        }
    }
}
