//! Reading plain chat aloud.

use std::sync::Arc;

use tracing::debug;

use yomiage_core::{GuildId, IncomingMessage, SpeechRequest, sanitize, truncate_for_speech};
use yomiage_worker::{Task, TaskError};

use super::{Handler, HandlerError};

impl Handler {
    pub(super) async fn speak(&self, message: &IncomingMessage) -> Result<(), HandlerError> {
        let guild_id = &message.guild_id;

        let Some(binding) = self.registry.binding(guild_id).await else {
            debug!(guild_id = %guild_id, "Not reading in this guild, message ignored");
            return Ok(());
        };
        if !binding.reads(&message.channel_id) {
            debug!(
                guild_id = %guild_id,
                channel_id = %message.channel_id,
                "Channel is not being read, message ignored"
            );
            return Ok(());
        }

        let language = self.language_of(&message.author_id).await;
        let identity = self.voice_identity_of(&message.author_id).await;

        let rendered = self.gateway.resolve_mentions(message).await;
        let text = truncate_for_speech(
            &sanitize(&rendered, &language),
            self.config.max_tts_chars,
        );
        if text.is_empty() {
            debug!(guild_id = %guild_id, "Nothing to read after sanitization");
            return Ok(());
        }

        let task = self.speech_task(guild_id.clone(), text, language, identity);
        self.registry.enqueue(guild_id, task).await;
        Ok(())
    }

    /// Task that synthesizes `text` and plays it into the guild's voice
    /// connection.
    pub(super) fn speech_task(
        &self,
        guild_id: GuildId,
        text: String,
        language: String,
        voice_identity: String,
    ) -> Task {
        let gateway = Arc::clone(&self.gateway);
        let speech = Arc::clone(&self.speech);
        let id = format!("Read {text} in guild {guild_id}");

        Task::new(id, move || async move {
            if !gateway.has_voice_connection(&guild_id).await {
                return Err(TaskError::PlaybackTargetMissing(guild_id));
            }
            let frames = speech
                .synthesize(&SpeechRequest::new(text, language, voice_identity))
                .await?;
            gateway.play(&guild_id, frames).await?;
            Ok(())
        })
    }
}
