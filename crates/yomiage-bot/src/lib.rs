//! Handler layer and composition root of the yomiage read-aloud bot.
//!
//! A gateway adapter (the chat-platform session) implements
//! [`GatewayPort`](yomiage_core::GatewayPort), calls [`bootstrap`] once, and
//! then forwards inbound events to [`BotContext::handler`]:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # async fn run(gateway: Arc<dyn yomiage_core::GatewayPort>) -> anyhow::Result<()> {
//! yomiage_bot::init_tracing();
//! let settings = yomiage_bot::load_settings();
//! let bot = yomiage_bot::bootstrap(gateway, &settings).await?;
//! // gateway loop: bot.handler().handle_message(message).await;
//! bot.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod messages;
pub mod telemetry;

pub use bootstrap::{BotComponents, assemble, bootstrap, load_settings};
pub use commands::{Command, classify};
pub use context::BotContext;
pub use handlers::{Handler, HandlerConfig, HandlerError};
pub use telemetry::init_tracing;
