//! Core domain for the yomiage read-aloud bot.
//!
//! This crate holds the pure parts of the system: identifiers and channel
//! bindings, the port traits the worker and handler layers consume (chat
//! gateway, speech backend, preference store, worker events), the bot
//! settings, and the deterministic text and voice rules. Nothing here
//! performs I/O.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;
pub mod text;
pub mod voice;

pub use domain::{ChannelBinding, ChannelId, GuildAvailability, GuildId, IncomingMessage, UserId};
pub use ports::{
    GatewayError, GatewayPort, JoinStatus, LeaveStatus, NoopWorkerEmitter, OpusFrames,
    PreferenceRepository, RepositoryError, SpeechError, SpeechSynthesizer, WorkerEvent,
    WorkerEventEmitter,
};
pub use settings::{BotSettings, DEFAULT_QUEUE_CAPACITY, SettingsError, validate_settings};
pub use text::{sanitize, truncate_for_speech};
pub use voice::{SpeechRequest, VoiceGender, VoiceProfile};
