//! The worker's execution loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use yomiage_core::{GuildId, WorkerEvent, WorkerEventEmitter};

use super::RunState;
use crate::stats::WorkerStats;
use crate::supervisor::panic_message;
use crate::task::{Task, TaskError};

pub(super) struct LoopContext {
    pub guild_id: GuildId,
    pub rx: mpsc::Receiver<Task>,
    pub cancel: CancellationToken,
    pub task_pause: Duration,
    pub emitter: Arc<dyn WorkerEventEmitter>,
    pub stats: Arc<WorkerStats>,
    pub state: Arc<watch::Sender<RunState>>,
}

/// Run tasks in arrival order until cancelled, then discard what is left.
///
/// Returns the number of discarded tasks.
pub(super) async fn run(mut ctx: LoopContext) -> usize {
    loop {
        // Cancellation wins over a ready task at every iteration boundary.
        let task = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            next = ctx.rx.recv() => match next {
                Some(task) => task,
                None => break,
            },
        };

        execute(&ctx, task).await;

        if !ctx.task_pause.is_zero() {
            tokio::select! {
                biased;
                () = ctx.cancel.cancelled() => break,
                () = tokio::time::sleep(ctx.task_pause) => {}
            }
        }
    }

    ctx.state.send_replace(RunState::Stopping);
    let discarded = drain(&mut ctx).await;

    ctx.emitter.emit(WorkerEvent::WorkerStopped {
        guild_id: ctx.guild_id.clone(),
        discarded,
    });
    ctx.state.send_replace(RunState::Stopped);
    discarded
}

async fn execute(ctx: &LoopContext, task: Task) {
    let (task_id, action) = task.into_parts();
    info!(guild_id = %ctx.guild_id, task_id = %task_id, "Task started");
    ctx.emitter.emit(WorkerEvent::TaskStarted {
        guild_id: ctx.guild_id.clone(),
        task_id: task_id.clone(),
    });

    let result = match AssertUnwindSafe(async move { action().await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
    };

    ctx.stats.record_executed(result.is_err());
    match result {
        Ok(()) => {
            info!(guild_id = %ctx.guild_id, task_id = %task_id, "Task finished");
            ctx.emitter.emit(WorkerEvent::TaskFinished {
                guild_id: ctx.guild_id.clone(),
                task_id,
            });
        }
        Err(e) => {
            error!(guild_id = %ctx.guild_id, task_id = %task_id, error = %e, "Task failed");
            ctx.emitter.emit(WorkerEvent::TaskFailed {
                guild_id: ctx.guild_id.clone(),
                task_id,
                error: e.to_string(),
            });
        }
    }
}

/// Close the queue and report every task that never ran.
async fn drain(ctx: &mut LoopContext) -> usize {
    ctx.rx.close();

    // `recv` after `close` also yields sends that raced the close, then `None`.
    let mut discarded = 0;
    while let Some(task) = ctx.rx.recv().await {
        discarded += 1;
        warn!(guild_id = %ctx.guild_id, task_id = %task.id(), "Discarding pending task");
        ctx.stats.record_discarded();
        ctx.emitter.emit(WorkerEvent::TaskDiscarded {
            guild_id: ctx.guild_id.clone(),
            task_id: task.id().to_string(),
        });
    }

    if discarded > 0 {
        debug!(guild_id = %ctx.guild_id, discarded, "Queue drained");
    }
    discarded
}
