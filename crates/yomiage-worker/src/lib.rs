//! Per-guild task execution for the yomiage read-aloud bot.
//!
//! - [`Task`]: an identifier plus a deferred async action.
//! - [`GuildWorker`]: one bounded FIFO queue and one execution loop per guild.
//! - [`WorkerRegistry`]: at most one worker per guild, safe under concurrent
//!   start/stop/enqueue.
//! - [`IdleReaper`]: periodic sweep that stops workers whose voice channel
//!   has emptied, supervised so it never dies permanently.
//!
//! Producers never wait on a worker: a full queue drops the task, and every
//! drop or stop-time discard is logged, counted in [`WorkerStats`] and sent
//! to the registry's [`WorkerEventEmitter`](yomiage_core::WorkerEventEmitter).

pub mod reaper;
pub mod registry;
pub mod stats;
pub mod supervisor;
pub mod task;
pub mod worker;

pub use reaper::{GuildCheck, IdleReaper, MIN_SWEEP_INTERVAL, ReaperConfig, SweepReport};
pub use registry::{StartOutcome, StopOutcome, WorkerRegistry};
pub use stats::{WorkerStats, WorkerStatsSnapshot};
pub use supervisor::supervise;
pub use task::{Task, TaskAction, TaskError};
pub use worker::{EnqueueOutcome, GuildWorker, RunState, WorkerConfig};
