//! Inbound gateway events, reduced to the fields the handler layer needs.

use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, UserId};

/// A chat message posted in a guild text channel.
///
/// `content` is the raw text as received, with mention markup such as
/// `<@1234>` still in place. Rendering mentions to display names is the
/// gateway's job (`GatewayPort::resolve_mentions`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub content: String,
}

impl IncomingMessage {
    pub fn new(
        guild_id: impl Into<GuildId>,
        channel_id: impl Into<ChannelId>,
        author_id: impl Into<UserId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
            author_id: author_id.into(),
            content: content.into(),
        }
    }
}

/// Guild availability change reported by the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildAvailability {
    pub guild_id: GuildId,
    pub available: bool,
}
