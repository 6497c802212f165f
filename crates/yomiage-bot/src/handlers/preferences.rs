//! Mention commands that read or change a user's speech preferences.

use tracing::info;

use yomiage_core::IncomingMessage;

use super::{Handler, HandlerError};
use crate::messages;

impl Handler {
    pub(super) async fn show_language(&self, message: &IncomingMessage) -> Result<(), HandlerError> {
        let language = self.language_of(&message.author_id).await;
        let name = self
            .display_name(&message.guild_id, &message.author_id)
            .await;
        self.reply(
            &message.channel_id,
            &messages::current_language(&name, &language),
        )
        .await;
        Ok(())
    }

    pub(super) async fn set_language(
        &self,
        message: &IncomingMessage,
        language: &str,
    ) -> Result<(), HandlerError> {
        self.preferences
            .set_language(&message.author_id, language)
            .await?;
        info!(user_id = %message.author_id, language, "Language updated");

        let name = self
            .display_name(&message.guild_id, &message.author_id)
            .await;
        self.reply(
            &message.channel_id,
            &messages::language_changed(&name, language),
        )
        .await;
        Ok(())
    }

    /// Give the author a fresh random voice and, when a session is running,
    /// let them hear it.
    pub(super) async fn randomize_voice(
        &self,
        message: &IncomingMessage,
    ) -> Result<(), HandlerError> {
        let identity = uuid::Uuid::new_v4().to_string();
        self.preferences
            .set_voice_identity(&message.author_id, &identity)
            .await?;
        info!(user_id = %message.author_id, "Voice identity randomized");

        let name = self
            .display_name(&message.guild_id, &message.author_id)
            .await;
        self.reply(&message.channel_id, &messages::voice_changed(&name))
            .await;

        if self.registry.is_active(&message.guild_id).await {
            let language = self.language_of(&message.author_id).await;
            let task = self.speech_task(
                message.guild_id.clone(),
                messages::VOICE_SAMPLE.to_string(),
                language,
                identity,
            );
            self.registry.enqueue(&message.guild_id, task).await;
        }
        Ok(())
    }
}
