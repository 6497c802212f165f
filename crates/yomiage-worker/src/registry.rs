//! Registry of live guild workers.
//!
//! The registry is the sole source of truth for "is this guild being served"
//! and enforces at most one worker per guild: creation is a check-and-insert
//! under the write lock, removal takes the worker out of the map before it is
//! stopped, and iteration works on a snapshot of keys so no lock is held
//! while a visitor runs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

use yomiage_core::{ChannelBinding, GuildId, NoopWorkerEmitter, WorkerEventEmitter};

use crate::stats::{WorkerStats, WorkerStatsSnapshot};
use crate::task::Task;
use crate::worker::{EnqueueOutcome, GuildWorker, RunState, WorkerConfig};

/// Result of [`WorkerRegistry::start_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A worker already existed; nothing changed.
    AlreadyRunning,
}

/// Result of [`WorkerRegistry::stop_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { discarded: usize },
    /// No worker existed; nothing changed.
    NotRunning,
}

/// Concurrent map from guild to its worker.
pub struct WorkerRegistry {
    workers: RwLock<HashMap<GuildId, GuildWorker>>,
    config: WorkerConfig,
    emitter: Arc<dyn WorkerEventEmitter>,
    stats: Arc<WorkerStats>,
}

impl WorkerRegistry {
    pub fn new(config: WorkerConfig, emitter: Arc<dyn WorkerEventEmitter>) -> Self {
        Self {
            workers: RwLock::new(HashMap::new()),
            config,
            emitter,
            stats: Arc::new(WorkerStats::new()),
        }
    }

    /// Registry with default settings and no event sink.
    pub fn with_defaults() -> Self {
        Self::new(WorkerConfig::default(), Arc::new(NoopWorkerEmitter::new()))
    }

    pub const fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Create and start a worker for the binding's guild unless one exists.
    pub async fn start_for(&self, binding: ChannelBinding) -> StartOutcome {
        let mut workers = self.workers.write().await;
        match workers.entry(binding.guild_id.clone()) {
            Entry::Occupied(existing) => {
                info!(
                    guild_id = %binding.guild_id,
                    voice_channel_id = %existing.get().binding().voice_channel_id,
                    "Worker already running, start ignored"
                );
                StartOutcome::AlreadyRunning
            }
            Entry::Vacant(slot) => {
                slot.insert(GuildWorker::spawn(
                    binding,
                    &self.config,
                    Arc::clone(&self.emitter),
                    Arc::clone(&self.stats),
                ));
                StartOutcome::Started
            }
        }
    }

    /// Remove the guild's worker and stop it.
    ///
    /// The worker leaves the map before `stop` runs, so a concurrent
    /// `start_for` may already create its successor while the old loop
    /// drains.
    pub async fn stop_for(&self, guild_id: &GuildId) -> StopOutcome {
        let removed = self.workers.write().await.remove(guild_id);
        match removed {
            Some(worker) => StopOutcome::Stopped {
                discarded: worker.stop().await,
            },
            None => {
                info!(guild_id = %guild_id, "No worker running, stop ignored");
                StopOutcome::NotRunning
            }
        }
    }

    /// Hand a task to the guild's worker without waiting for queue space.
    pub async fn enqueue(&self, guild_id: &GuildId, task: Task) -> EnqueueOutcome {
        let workers = self.workers.read().await;
        if let Some(worker) = workers.get(guild_id) {
            worker.try_enqueue(task)
        } else {
            debug!(guild_id = %guild_id, task_id = %task.id(), "No worker for guild, task ignored");
            EnqueueOutcome::NoWorker
        }
    }

    pub async fn is_active(&self, guild_id: &GuildId) -> bool {
        self.workers.read().await.contains_key(guild_id)
    }

    /// Channel binding of the guild's worker, if one is active.
    pub async fn binding(&self, guild_id: &GuildId) -> Option<ChannelBinding> {
        self.workers
            .read()
            .await
            .get(guild_id)
            .map(|worker| worker.binding().clone())
    }

    /// Lifecycle of the guild's current worker, if one is active.
    ///
    /// The receiver keeps reporting after the worker is stopped, so a caller
    /// can wait for `RunState::Stopped`.
    pub async fn subscribe_state(&self, guild_id: &GuildId) -> Option<watch::Receiver<RunState>> {
        self.workers
            .read()
            .await
            .get(guild_id)
            .map(GuildWorker::subscribe_state)
    }

    /// Snapshot of the guilds with an active worker.
    pub async fn active_guilds(&self) -> Vec<GuildId> {
        self.workers.read().await.keys().cloned().collect()
    }

    /// Visit every active guild sequentially.
    ///
    /// Works on a snapshot, so the visitor may call `start_for`/`stop_for`.
    pub async fn for_each_guild<F, Fut>(&self, mut visitor: F)
    where
        F: FnMut(GuildId) -> Fut,
        Fut: Future<Output = ()>,
    {
        for guild_id in self.active_guilds().await {
            visitor(guild_id).await;
        }
    }

    /// Totals across every worker this registry created.
    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop every worker. Returns the total number of discarded tasks.
    pub async fn stop_all(&self) -> usize {
        let workers: Vec<GuildWorker> = {
            let mut map = self.workers.write().await;
            map.drain().map(|(_, worker)| worker).collect()
        };

        let count = workers.len();
        let mut discarded = 0;
        for worker in workers {
            discarded += worker.stop().await;
        }
        info!(workers = count, discarded, "All workers stopped");
        discarded
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
