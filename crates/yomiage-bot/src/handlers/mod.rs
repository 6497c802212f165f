//! Message and guild event handlers.
//!
//! The gateway adapter calls [`Handler::handle_message`] and
//! [`Handler::handle_guild_availability`] from its event-dispatch context.
//! Speech is only ever enqueued, never awaited. Stopping a worker (`!bye`, or
//! a guild going unavailable) does wait for the task currently being read,
//! which can take as long as one synthesize-and-play round trip. A panic
//! inside a handler is caught and logged instead of reaching the dispatcher.

mod preferences;
mod session;
mod speak;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use yomiage_core::{
    BotSettings, ChannelId, GatewayError, GatewayPort, GuildAvailability, GuildId,
    IncomingMessage, PreferenceRepository, RepositoryError, SpeechSynthesizer, UserId,
};
use yomiage_worker::WorkerRegistry;

use crate::commands::{Command, classify};

/// Handler-level failures. Logged, never surfaced to the gateway.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Preference store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Settings the handlers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Language for users without a stored preference.
    pub default_language: String,
    /// Characters read per message before truncation.
    pub max_tts_chars: usize,
    /// Wait between starting a worker and joining voice.
    pub join_delay: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::from(&BotSettings::with_defaults())
    }
}

impl From<&BotSettings> for HandlerConfig {
    fn from(settings: &BotSettings) -> Self {
        Self {
            default_language: settings.default_language.clone(),
            max_tts_chars: settings.max_tts_chars,
            join_delay: Duration::from_millis(200),
        }
    }
}

pub struct Handler {
    gateway: Arc<dyn GatewayPort>,
    registry: Arc<WorkerRegistry>,
    preferences: Arc<dyn PreferenceRepository>,
    speech: Arc<dyn SpeechSynthesizer>,
    config: HandlerConfig,
}

impl Handler {
    pub fn new(
        gateway: Arc<dyn GatewayPort>,
        registry: Arc<WorkerRegistry>,
        preferences: Arc<dyn PreferenceRepository>,
        speech: Arc<dyn SpeechSynthesizer>,
        config: HandlerConfig,
    ) -> Self {
        Self {
            gateway,
            registry,
            preferences,
            speech,
            config,
        }
    }

    pub const fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Handle an inbound chat message.
    pub async fn handle_message(&self, message: IncomingMessage) {
        let guild_id = message.guild_id.clone();
        let outcome = AssertUnwindSafe(self.dispatch(&message))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(guild_id = %guild_id, error = %e, "Message handler failed"),
            Err(_) => error!(guild_id = %guild_id, "Message handler panicked, recovered"),
        }
    }

    /// Handle a guild becoming available or unavailable.
    ///
    /// An unavailable guild has lost its voice connection, so its worker is
    /// stopped right away instead of waiting for the idle reaper. Returns
    /// once the task in flight, if any, has finished.
    pub async fn handle_guild_availability(&self, event: GuildAvailability) {
        if event.available {
            info!(guild_id = %event.guild_id, "Guild available");
            return;
        }

        warn!(guild_id = %event.guild_id, "Guild unavailable");
        if self.registry.is_active(&event.guild_id).await {
            self.registry.stop_for(&event.guild_id).await;
        }
    }

    async fn dispatch(&self, message: &IncomingMessage) -> Result<(), HandlerError> {
        let bot_id = self.gateway.bot_user_id();
        let command = classify(&message.content, bot_id.as_str());

        if command.is_command() && message.author_id == bot_id {
            debug!(guild_id = %message.guild_id, "Ignoring own command");
            return Ok(());
        }

        match command {
            Command::Summon => self.summon(message).await,
            Command::Dismiss => self.dismiss(message).await,
            Command::Help => {
                self.reply(&message.channel_id, crate::messages::USAGE).await;
                Ok(())
            }
            Command::Language(None) => self.show_language(message).await,
            Command::Language(Some(language)) => self.set_language(message, &language).await,
            Command::RandomizeVoice => self.randomize_voice(message).await,
            Command::Speak => self.speak(message).await,
            Command::Ignore => Ok(()),
        }
    }

    /// Post a reply; delivery failures are only logged.
    async fn reply(&self, channel: &ChannelId, text: &str) {
        if let Err(e) = self.gateway.send_message(channel, text).await {
            warn!(channel_id = %channel, error = %e, "Failed to send reply");
        }
    }

    async fn language_of(&self, user: &UserId) -> String {
        match self.preferences.language(user).await {
            Ok(Some(language)) => language,
            Ok(None) => self.config.default_language.clone(),
            Err(e) => {
                warn!(user_id = %user, error = %e, "Failed to read language, using default");
                self.config.default_language.clone()
            }
        }
    }

    async fn voice_identity_of(&self, user: &UserId) -> String {
        match self.preferences.voice_identity(user).await {
            Ok(Some(identity)) => identity,
            Ok(None) => user.to_string(),
            Err(e) => {
                warn!(user_id = %user, error = %e, "Failed to read voice identity, using user id");
                user.to_string()
            }
        }
    }

    async fn display_name(&self, guild: &GuildId, user: &UserId) -> String {
        self.gateway
            .display_name(guild, user)
            .await
            .unwrap_or_else(|_| user.to_string())
    }
}
