//! Chat gateway port.
//!
//! The gateway is the chat-platform session: it delivers inbound events,
//! answers membership questions and owns the voice connections. The worker
//! core only ever talks to it through this trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChannelId, GuildId, IncomingMessage, UserId};

use super::speech::OpusFrames;

/// Outcome of asking the gateway to join a voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStatus {
    /// The bot joined the requested channel.
    Joined,
    /// A voice connection to the requested channel already existed.
    AlreadyInChannel,
    /// The bot is connected to a different voice channel of the guild.
    InOtherChannel,
}

/// Outcome of asking the gateway to leave a guild's voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveStatus {
    /// The voice connection was closed.
    Left,
    /// There was no voice connection for the guild.
    NotConnected,
}

/// Errors reported by the chat gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The guild is not present in the gateway's state cache.
    #[error("Guild not found: {0}")]
    GuildNotFound(GuildId),

    /// The channel is not present in the gateway's state cache.
    #[error("Channel not found: {0}")]
    ChannelNotFound(ChannelId),

    /// There is no voice connection for the guild.
    #[error("No voice connection on guild {0}")]
    NotConnected(GuildId),

    /// The platform rejected or failed the request.
    #[error("Gateway request failed: {0}")]
    Request(String),
}

/// Port for the chat-platform session.
///
/// Implementations must be cheap to call from any task; the worker loop and
/// the idle reaper call into it concurrently for different guilds.
#[async_trait]
pub trait GatewayPort: Send + Sync {
    /// Identifier of the bot's own user.
    fn bot_user_id(&self) -> UserId;

    /// Post a text message to a channel.
    async fn send_message(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError>;

    /// Voice channel the user currently sits in, if any.
    async fn voice_state_of(
        &self,
        user: &UserId,
        guild: &GuildId,
    ) -> Result<Option<ChannelId>, GatewayError>;

    /// Connect the bot to a voice channel.
    async fn join_voice(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<JoinStatus, GatewayError>;

    /// Disconnect the bot from the guild's voice channel.
    async fn leave_voice(&self, guild: &GuildId) -> Result<LeaveStatus, GatewayError>;

    /// Whether the bot is alone (or disconnected) in its voice channel.
    ///
    /// Resolves the channel of the guild's voice connection and counts its
    /// occupants; one occupant or fewer means alone. A guild without a voice
    /// connection reports `true`.
    async fn is_alone_in_voice(&self, guild: &GuildId) -> Result<bool, GatewayError>;

    /// Whether the guild currently has a live voice connection.
    async fn has_voice_connection(&self, guild: &GuildId) -> bool;

    /// Send Opus frames to the guild's voice connection, toggling the
    /// speaking flag around them.
    async fn play(&self, guild: &GuildId, frames: OpusFrames) -> Result<(), GatewayError>;

    /// Display name of a member (nickname, falling back to user name).
    async fn display_name(&self, guild: &GuildId, user: &UserId) -> Result<String, GatewayError>;

    /// Human-readable name of a channel.
    async fn channel_name(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<String, GatewayError>;

    /// Message content with user, role, channel and custom-emoji mentions
    /// rendered as readable names.
    async fn resolve_mentions(&self, message: &IncomingMessage) -> String;
}
