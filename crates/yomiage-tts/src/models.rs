//! Wire types for the `text:synthesize` endpoint.

use serde::{Deserialize, Serialize};

use yomiage_core::{VoiceGender, VoiceProfile};

/// Audio encoding requested from the API; Ogg-wrapped Opus at 48 kHz.
pub const AUDIO_ENCODING: &str = "OGG_OPUS";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    pub input: SynthesisInput,
    pub voice: VoiceSelection,
    pub audio_config: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub language_code: String,
    pub ssml_gender: VoiceGender,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: &'static str,
    pub speaking_rate: f64,
    pub pitch: f64,
}

impl SynthesizeRequest {
    pub fn new(text: impl Into<String>, language: impl Into<String>, profile: VoiceProfile) -> Self {
        Self {
            input: SynthesisInput { text: text.into() },
            voice: VoiceSelection {
                language_code: language.into(),
                ssml_gender: profile.gender,
            },
            audio_config: AudioConfig {
                audio_encoding: AUDIO_ENCODING,
                speaking_rate: profile.speaking_rate,
                pitch: profile.pitch,
            },
        }
    }
}

/// Successful response; `audio_content` is base64.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    #[serde(default)]
    pub audio_content: String,
}
