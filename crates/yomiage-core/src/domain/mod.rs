//! Domain types shared by the worker and handler layers.
//!
//! Pure data types with no I/O dependencies.

mod binding;
mod ids;
mod message;

pub use binding::ChannelBinding;
pub use ids::{ChannelId, GuildId, UserId};
pub use message::{GuildAvailability, IncomingMessage};
