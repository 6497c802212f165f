//! Speech backend for yomiage.
//!
//! [`GoogleTtsClient`] implements the
//! [`SpeechSynthesizer`](yomiage_core::SpeechSynthesizer) port on top of the
//! Google Cloud Text-to-Speech REST API. Audio comes back as an Ogg/Opus
//! file, which [`ogg::packets`] splits into the raw Opus packets a voice
//! connection expects.
//!
//! ```text
//! GoogleTtsClient ──> SynthesisBackend (trait) ──> ReqwestBackend ──> text:synthesize
//!        │
//!        └──> base64 decode ──> ogg::packets ──> OpusFrames
//! ```

mod client;
mod config;
mod error;
mod http;
mod models;
pub mod ogg;

pub use client::GoogleTtsClient;
pub use config::{DEFAULT_ENDPOINT, GoogleTtsConfig};
pub use error::{TtsClientError, TtsResult};
pub use http::{ReqwestBackend, SynthesisBackend};
pub use models::{AudioConfig, SynthesisInput, SynthesizeRequest, SynthesizeResponse, VoiceSelection};
