//! Internal error types for the TTS adapter.
//!
//! These errors stay inside `yomiage-tts` and are mapped to
//! [`SpeechError`] at the port boundary.

use thiserror::Error;

use yomiage_core::SpeechError;

use crate::ogg::OggError;

pub type TtsResult<T> = Result<T, TtsClientError>;

#[derive(Debug, Error)]
pub enum TtsClientError {
    #[error("GOOGLE_TTS_API_KEY is not set")]
    MissingApiKey,

    /// The API answered with an error status.
    #[error("TTS API request failed with status {status}: {message}")]
    ApiRequestFailed { status: u16, message: String },

    #[error("Invalid response from TTS API: {message}")]
    InvalidResponse { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Audio content is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Malformed Ogg stream: {0}")]
    Ogg(#[from] OggError),
}

impl From<TtsClientError> for SpeechError {
    fn from(err: TtsClientError) -> Self {
        match err {
            TtsClientError::Base64(_) | TtsClientError::Ogg(_) => {
                Self::InvalidAudio(err.to_string())
            }
            other => Self::Backend(other.to_string()),
        }
    }
}
