//! Voice/text channel binding for an active guild worker.

use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId};

/// Which text channel is read into which voice channel for one guild.
///
/// A binding lives exactly as long as the guild's worker. Producers use it to
/// check that a message was posted in the served text channel; the idle
/// reaper uses the guild key to find the voice connection to inspect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    pub guild_id: GuildId,
    pub voice_channel_id: ChannelId,
    pub text_channel_id: ChannelId,
}

impl ChannelBinding {
    pub fn new(
        guild_id: impl Into<GuildId>,
        voice_channel_id: impl Into<ChannelId>,
        text_channel_id: impl Into<ChannelId>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            voice_channel_id: voice_channel_id.into(),
            text_channel_id: text_channel_id.into(),
        }
    }

    /// Whether `channel` is the text channel this binding reads.
    #[must_use]
    pub fn reads(&self, channel: &ChannelId) -> bool {
        &self.text_channel_id == channel
    }
}
