//! Speech synthesis port.

use async_trait::async_trait;
use thiserror::Error;

use crate::voice::SpeechRequest;

/// Opus packets ready to be sent to a voice connection, in playback order.
pub type OpusFrames = Vec<Vec<u8>>;

/// Errors returned by speech backends.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Nothing left to say after sanitization.
    #[error("Empty text after sanitization")]
    EmptyText,

    /// The backend rejected or failed the request.
    #[error("Speech backend request failed: {0}")]
    Backend(String),

    /// The backend returned audio that could not be decoded into frames.
    #[error("Invalid audio from speech backend: {0}")]
    InvalidAudio(String),
}

/// Port for text-to-speech backends.
///
/// Output is deterministic per `(text, language, voice_identity)` for a given
/// backend version; voice timbre, rate and pitch come from
/// [`SpeechRequest::profile`].
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Convert text into Opus frames.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<OpusFrames, SpeechError>;
}
