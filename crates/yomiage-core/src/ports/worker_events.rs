//! Worker event emitter port.
//!
//! Every lifecycle step of a guild worker is reported here in addition to
//! the log line, so drops and discards can be counted or alerted on without
//! scraping logs.

use serde::Serialize;

use crate::domain::GuildId;

/// Lifecycle events emitted by guild workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// A worker was created and its loop launched.
    WorkerStarted { guild_id: GuildId },
    /// A task was accepted into the queue.
    TaskQueued { guild_id: GuildId, task_id: String },
    /// A task was rejected because the queue was full.
    TaskDropped { guild_id: GuildId, task_id: String },
    /// The loop began executing a task.
    TaskStarted { guild_id: GuildId, task_id: String },
    /// A task's action returned success.
    TaskFinished { guild_id: GuildId, task_id: String },
    /// A task's action returned an error or panicked.
    TaskFailed {
        guild_id: GuildId,
        task_id: String,
        error: String,
    },
    /// A task still queued at stop time was thrown away unexecuted.
    TaskDiscarded { guild_id: GuildId, task_id: String },
    /// The loop exited.
    WorkerStopped { guild_id: GuildId, discarded: usize },
}

impl WorkerEvent {
    /// Guild the event belongs to.
    #[must_use]
    pub const fn guild_id(&self) -> &GuildId {
        match self {
            Self::WorkerStarted { guild_id }
            | Self::TaskQueued { guild_id, .. }
            | Self::TaskDropped { guild_id, .. }
            | Self::TaskStarted { guild_id, .. }
            | Self::TaskFinished { guild_id, .. }
            | Self::TaskFailed { guild_id, .. }
            | Self::TaskDiscarded { guild_id, .. }
            | Self::WorkerStopped { guild_id, .. } => guild_id,
        }
    }
}

/// Port for observing worker events.
///
/// Called inline from the producer path (`TaskQueued`, `TaskDropped`) and
/// from the worker loop, so implementations must not block.
pub trait WorkerEventEmitter: Send + Sync {
    /// Emit a worker event.
    fn emit(&self, event: WorkerEvent);
}

/// A no-op worker event emitter for tests and deployments without metrics.
#[derive(Debug, Clone, Default)]
pub struct NoopWorkerEmitter;

impl NoopWorkerEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl WorkerEventEmitter for NoopWorkerEmitter {
    fn emit(&self, _event: WorkerEvent) {}
}
