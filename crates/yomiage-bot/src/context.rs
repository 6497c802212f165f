//! The running bot.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use yomiage_worker::{IdleReaper, WorkerRegistry, WorkerStatsSnapshot};

use crate::handlers::Handler;

/// Everything the gateway adapter needs after bootstrap.
pub struct BotContext {
    handler: Arc<Handler>,
    registry: Arc<WorkerRegistry>,
    reaper: Arc<IdleReaper>,
    reaper_task: JoinHandle<()>,
    cancel: CancellationToken,
}

impl BotContext {
    pub(crate) const fn new(
        handler: Arc<Handler>,
        registry: Arc<WorkerRegistry>,
        reaper: Arc<IdleReaper>,
        reaper_task: JoinHandle<()>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            handler,
            registry,
            reaper,
            reaper_task,
            cancel,
        }
    }

    /// Entry point for gateway events.
    pub fn handler(&self) -> &Arc<Handler> {
        &self.handler
    }

    pub fn registry(&self) -> &Arc<WorkerRegistry> {
        &self.registry
    }

    pub fn reaper(&self) -> &Arc<IdleReaper> {
        &self.reaper
    }

    /// Process-wide worker counters.
    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.registry.stats()
    }

    /// Stop the idle reaper and every guild worker.
    pub async fn shutdown(self) {
        info!("Shutting down");
        self.cancel.cancel();
        if let Err(e) = self.reaper_task.await {
            warn!(error = %e, "Idle reaper did not exit cleanly");
        }
        let discarded = self.registry.stop_all().await;
        info!(discarded, "Shutdown complete");
    }
}
