//! Idle reaper: stops workers whose voice channel has emptied.
//!
//! Every `interval` the reaper snapshots the active guilds and, pausing
//! `guild_delay` before each one, asks the gateway whether the bot is alone
//! in its voice channel. Lonely guilds get their worker stopped and the
//! voice connection closed. One guild's failure (error or panic) never
//! aborts the sweep, and [`IdleReaper::spawn_supervised`] restarts the whole
//! loop if it ever ends unexpectedly.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use yomiage_core::{BotSettings, GatewayError, GatewayPort, GuildId, LeaveStatus};

use crate::registry::{StopOutcome, WorkerRegistry};
use crate::supervisor::{panic_message, supervise};

/// Shortest period the reaper sweeps at; smaller intervals are raised to it.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Timing of the idle reaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaperConfig {
    /// Period between sweeps.
    pub interval: Duration,
    /// Pause before each guild check.
    pub guild_delay: Duration,
    /// Minimum wait before restarting a failed reaper loop.
    pub restart_delay: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            guild_delay: Duration::from_secs(1),
            restart_delay: Duration::from_secs(1),
        }
    }
}

impl From<&BotSettings> for ReaperConfig {
    fn from(settings: &BotSettings) -> Self {
        Self {
            interval: settings.reaper_interval.max(MIN_SWEEP_INTERVAL),
            guild_delay: settings.reaper_guild_delay,
            restart_delay: settings.reaper_restart_delay,
        }
    }
}

/// Outcome of checking one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuildCheck {
    /// Listeners remain; the worker keeps running.
    Occupied,
    /// The bot was alone; worker stopped and voice left.
    Reaped,
    /// The worker disappeared before the check ran.
    Gone,
}

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub reaped: usize,
    pub failed: usize,
}

pub struct IdleReaper {
    registry: Arc<WorkerRegistry>,
    gateway: Arc<dyn GatewayPort>,
    config: ReaperConfig,
}

impl IdleReaper {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        gateway: Arc<dyn GatewayPort>,
        config: ReaperConfig,
    ) -> Self {
        Self {
            registry,
            gateway,
            config,
        }
    }

    pub const fn config(&self) -> &ReaperConfig {
        &self.config
    }

    /// Check every active guild once.
    pub async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        for guild_id in self.registry.active_guilds().await {
            if !self.config.guild_delay.is_zero() {
                tokio::time::sleep(self.config.guild_delay).await;
            }

            report.checked += 1;
            match AssertUnwindSafe(self.check_guild(&guild_id))
                .catch_unwind()
                .await
            {
                Ok(Ok(GuildCheck::Reaped)) => report.reaped += 1,
                Ok(Ok(GuildCheck::Occupied | GuildCheck::Gone)) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(guild_id = %guild_id, error = %e, "Idle check failed");
                }
                Err(payload) => {
                    report.failed += 1;
                    error!(
                        guild_id = %guild_id,
                        panic = %panic_message(payload.as_ref()),
                        "Idle check panicked"
                    );
                }
            }
        }

        if report.checked > 0 {
            debug!(
                checked = report.checked,
                reaped = report.reaped,
                failed = report.failed,
                "Idle sweep finished"
            );
        }
        report
    }

    /// Check one guild and reap it if the bot is alone.
    pub async fn check_guild(&self, guild_id: &GuildId) -> Result<GuildCheck, GatewayError> {
        if !self.registry.is_active(guild_id).await {
            return Ok(GuildCheck::Gone);
        }
        if !self.gateway.is_alone_in_voice(guild_id).await? {
            return Ok(GuildCheck::Occupied);
        }

        info!(guild_id = %guild_id, "Bot is alone in voice channel, stopping worker");
        if let StopOutcome::Stopped { discarded } = self.registry.stop_for(guild_id).await {
            debug!(guild_id = %guild_id, discarded, "Idle worker stopped");
        }

        match self.gateway.leave_voice(guild_id).await {
            Ok(LeaveStatus::Left) => info!(guild_id = %guild_id, "Left idle voice channel"),
            Ok(LeaveStatus::NotConnected) => {
                debug!(guild_id = %guild_id, "Voice connection already closed");
            }
            Err(e) => warn!(guild_id = %guild_id, error = %e, "Failed to leave voice channel"),
        }
        Ok(GuildCheck::Reaped)
    }

    /// Sweep every `interval` until cancelled. The first sweep runs one
    /// interval after start.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = self.config.interval.max(MIN_SWEEP_INTERVAL);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval = ?period, "Idle reaper started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.sweep_once() => {}
            }
        }
    }

    /// Spawn the reaper under a supervisor that restarts it after faults.
    pub fn spawn_supervised(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let restart_delay = self.config.restart_delay;
        tokio::spawn(supervise(
            "idle-reaper",
            restart_delay,
            cancel.clone(),
            move || {
                let reaper = Arc::clone(&self);
                let cancel = cancel.clone();
                async move { reaper.run(cancel).await }
            },
        ))
    }
}
