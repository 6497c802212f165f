//! Bot bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together.
//! All concrete implementations are instantiated here:
//! - Preference store (via yomiage-db)
//! - Speech backend (via yomiage-tts)
//! - Worker registry and idle reaper (via yomiage-worker)
//!
//! The chat gateway is supplied by the caller; everything else is built
//! from [`BotSettings`].

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use yomiage_core::{
    BotSettings, GatewayPort, NoopWorkerEmitter, PreferenceRepository, SettingsError,
    SpeechSynthesizer, WorkerEventEmitter, validate_settings,
};
use yomiage_db::{SqlitePreferenceRepository, setup_database};
use yomiage_tts::{GoogleTtsClient, GoogleTtsConfig};
use yomiage_worker::{IdleReaper, ReaperConfig, WorkerConfig, WorkerRegistry};

use crate::context::BotContext;
use crate::handlers::{Handler, HandlerConfig};

/// Load settings from the environment, reading `.env` first if present.
pub fn load_settings() -> BotSettings {
    if let Ok(path) = dotenvy::dotenv() {
        info!(path = %path.display(), "Loaded environment file");
    }
    BotSettings::from_env()
}

/// Concrete adapters the bot is assembled from.
pub struct BotComponents {
    pub gateway: Arc<dyn GatewayPort>,
    pub preferences: Arc<dyn PreferenceRepository>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub emitter: Arc<dyn WorkerEventEmitter>,
}

/// Bootstrap the bot against a live gateway.
///
/// This is the composition root. It:
/// 1. Validates the settings
/// 2. Opens the preference database
/// 3. Creates the Google TTS client from `GOOGLE_TTS_*` variables
/// 4. Assembles registry, handler and the supervised idle reaper
pub async fn bootstrap(gateway: Arc<dyn GatewayPort>, settings: &BotSettings) -> Result<BotContext> {
    validate_settings(settings).context("invalid settings")?;

    let pool = setup_database(&settings.database_path)
        .await
        .with_context(|| format!("opening {}", settings.database_path.display()))?;
    let preferences: Arc<dyn PreferenceRepository> =
        Arc::new(SqlitePreferenceRepository::new(pool));

    let tts_config = GoogleTtsConfig::from_env().context("configuring TTS client")?;
    let speech: Arc<dyn SpeechSynthesizer> =
        Arc::new(GoogleTtsClient::new(&tts_config).context("building TTS client")?);

    let components = BotComponents {
        gateway,
        preferences,
        speech,
        emitter: Arc::new(NoopWorkerEmitter::new()),
    };
    assemble(components, settings).context("assembling bot")
}

/// Wire already-built adapters together and start the idle reaper.
///
/// Settings are validated first; nothing is spawned when they are rejected.
/// Must be called from within a tokio runtime.
pub fn assemble(
    components: BotComponents,
    settings: &BotSettings,
) -> Result<BotContext, SettingsError> {
    validate_settings(settings)?;

    let registry = Arc::new(WorkerRegistry::new(
        WorkerConfig::from(settings),
        components.emitter,
    ));

    let handler = Arc::new(Handler::new(
        Arc::clone(&components.gateway),
        Arc::clone(&registry),
        components.preferences,
        components.speech,
        HandlerConfig::from(settings),
    ));

    let reaper = Arc::new(IdleReaper::new(
        Arc::clone(&registry),
        components.gateway,
        ReaperConfig::from(settings),
    ));
    let cancel = CancellationToken::new();
    let reaper_task = Arc::clone(&reaper).spawn_supervised(cancel.clone());

    info!(
        default_language = %settings.default_language,
        queue_capacity = settings.queue_capacity,
        reaper_interval = ?settings.reaper_interval,
        "Bot assembled"
    );
    Ok(BotContext::new(
        handler,
        registry,
        reaper,
        reaper_task,
        cancel,
    ))
}
