//! Google TTS client implementing the speech port.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use yomiage_core::{OpusFrames, SpeechError, SpeechRequest, SpeechSynthesizer, sanitize};

use crate::config::GoogleTtsConfig;
use crate::error::{TtsClientError, TtsResult};
use crate::http::{ReqwestBackend, SynthesisBackend};
use crate::models::SynthesizeRequest;
use crate::ogg;

/// Speech synthesizer backed by Google Cloud Text-to-Speech.
///
/// The voice gender, rate and pitch come from the request's
/// [`VoiceProfile`](yomiage_core::VoiceProfile), so a user's voice is stable
/// across messages.
pub struct GoogleTtsClient<B = ReqwestBackend> {
    backend: B,
}

impl GoogleTtsClient<ReqwestBackend> {
    /// Client talking to the configured endpoint over HTTPS.
    pub fn new(config: &GoogleTtsConfig) -> TtsResult<Self> {
        Ok(Self::with_backend(ReqwestBackend::new(config)?))
    }
}

impl<B: SynthesisBackend> GoogleTtsClient<B> {
    /// Client over an arbitrary backend (used by tests).
    pub const fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    async fn synthesize_frames(&self, text: &str, request: &SpeechRequest) -> TtsResult<OpusFrames> {
        let body = SynthesizeRequest::new(text, &request.language, request.profile());
        let response = self.backend.synthesize(&body).await?;

        if response.audio_content.is_empty() {
            return Err(TtsClientError::InvalidResponse {
                message: "response carried no audio content".to_string(),
            });
        }
        let audio = STANDARD.decode(response.audio_content.as_bytes())?;
        debug!(bytes = audio.len(), language = %request.language, "Ogg audio received");

        Ok(ogg::packets(&audio)?)
    }
}

#[async_trait]
impl<B: SynthesisBackend> SpeechSynthesizer for GoogleTtsClient<B> {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<OpusFrames, SpeechError> {
        let text = sanitize(&request.text, &request.language);
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let frames = self.synthesize_frames(&text, request).await?;
        debug!(frames = frames.len(), "Speech synthesized");
        Ok(frames)
    }
}
