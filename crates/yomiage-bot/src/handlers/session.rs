//! `!hi` and `!bye`: starting and stopping a guild's reading session.

use tracing::info;

use yomiage_core::{ChannelBinding, IncomingMessage};
use yomiage_worker::StartOutcome;

use super::{Handler, HandlerError};
use crate::messages;

impl Handler {
    pub(super) async fn summon(&self, message: &IncomingMessage) -> Result<(), HandlerError> {
        let guild_id = &message.guild_id;

        if let Some(binding) = self.registry.binding(guild_id).await {
            info!(
                guild_id = %guild_id,
                voice_channel_id = %binding.voice_channel_id,
                "Already reading in this guild"
            );
            let name = self
                .gateway
                .channel_name(guild_id, &binding.voice_channel_id)
                .await?;
            self.reply(&message.channel_id, &messages::already_reading(&name))
                .await;
            return Ok(());
        }

        let Some(voice_channel) = self
            .gateway
            .voice_state_of(&message.author_id, guild_id)
            .await?
        else {
            info!(guild_id = %guild_id, user_id = %message.author_id, "Author is not in a voice channel");
            self.reply(&message.channel_id, messages::JOIN_VOICE_FIRST)
                .await;
            return Ok(());
        };

        let binding = ChannelBinding::new(
            guild_id.clone(),
            voice_channel.clone(),
            message.channel_id.clone(),
        );
        if self.registry.start_for(binding).await == StartOutcome::AlreadyRunning {
            // Lost a race with a concurrent `!hi`; that one owns the session.
            return Ok(());
        }

        if !self.config.join_delay.is_zero() {
            tokio::time::sleep(self.config.join_delay).await;
        }
        let status = self.gateway.join_voice(guild_id, &voice_channel).await?;
        self.reply(&message.channel_id, messages::join_status(status))
            .await;
        Ok(())
    }

    pub(super) async fn dismiss(&self, message: &IncomingMessage) -> Result<(), HandlerError> {
        let guild_id = &message.guild_id;

        let Some(binding) = self.registry.binding(guild_id).await else {
            info!(guild_id = %guild_id, "Not reading in this guild");
            self.reply(&message.channel_id, messages::NOT_READING).await;
            return Ok(());
        };

        if !binding.reads(&message.channel_id) {
            let this = self
                .gateway
                .channel_name(guild_id, &message.channel_id)
                .await?;
            let bound = self
                .gateway
                .channel_name(guild_id, &binding.text_channel_id)
                .await?;
            self.reply(
                &message.channel_id,
                &messages::wrong_text_channel(&this, &bound),
            )
            .await;
            return Ok(());
        }

        match self
            .gateway
            .voice_state_of(&message.author_id, guild_id)
            .await?
        {
            None => {
                self.reply(&message.channel_id, messages::JOIN_VOICE_FIRST)
                    .await;
                return Ok(());
            }
            Some(channel) if channel != binding.voice_channel_id => {
                let name = self
                    .gateway
                    .channel_name(guild_id, &binding.voice_channel_id)
                    .await?;
                self.reply(
                    &message.channel_id,
                    &messages::join_bound_voice_first(&name),
                )
                .await;
                return Ok(());
            }
            Some(_) => {}
        }

        self.registry.stop_for(guild_id).await;
        let status = self.gateway.leave_voice(guild_id).await?;
        self.reply(&message.channel_id, messages::leave_status(status))
            .await;
        Ok(())
    }
}
