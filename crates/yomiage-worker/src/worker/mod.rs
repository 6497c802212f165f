//! Per-guild worker: one bounded queue and one execution loop.
//!
//! The worker is the only owner of its queue's receiving end. Producers hold
//! the sending end through [`GuildWorker::try_enqueue`], which never waits:
//! a full queue drops the task and reports the drop.
//!
//! # Lifecycle
//!
//! `spawn` → `Running` → (`stop` called) `Stopping` → loop exits → `Stopped`.
//! A stopped worker is never restarted; the registry creates a fresh one.

mod run_loop;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use yomiage_core::{
    BotSettings, ChannelBinding, DEFAULT_QUEUE_CAPACITY, GuildId, WorkerEvent, WorkerEventEmitter,
};

use crate::stats::WorkerStats;
use crate::task::Task;

/// Settings shared by every worker of a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Bounded queue capacity.
    pub queue_capacity: usize,
    /// Pause after each executed task. Zero disables it.
    pub task_pause: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            task_pause: Duration::from_millis(100),
        }
    }
}

impl From<&BotSettings> for WorkerConfig {
    fn from(settings: &BotSettings) -> Self {
        Self {
            queue_capacity: settings.queue_capacity,
            task_pause: settings.task_pause,
        }
    }
}

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Accepting and executing tasks.
    Running,
    /// Cancellation observed; pending tasks are being discarded.
    Stopping,
    /// The loop has exited.
    Stopped,
}

/// What happened to a task handed to a worker or registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Accepted into the queue.
    Queued,
    /// Rejected: the queue was full or already closing.
    Dropped,
    /// No worker is active for the guild (registry only).
    NoWorker,
}

/// A running per-guild worker.
///
/// Dropping a worker without calling [`stop`](Self::stop) still cancels its
/// loop, but nobody waits for the loop to finish.
pub struct GuildWorker {
    binding: ChannelBinding,
    tx: mpsc::Sender<Task>,
    cancel: CancellationToken,
    state: Arc<watch::Sender<RunState>>,
    handle: Option<JoinHandle<usize>>,
    emitter: Arc<dyn WorkerEventEmitter>,
    stats: Arc<WorkerStats>,
}

impl GuildWorker {
    /// Allocate the queue and launch the execution loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        binding: ChannelBinding,
        config: &WorkerConfig,
        emitter: Arc<dyn WorkerEventEmitter>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let cancel = CancellationToken::new();
        let (state, _) = watch::channel(RunState::Running);
        let state = Arc::new(state);

        let handle = tokio::spawn(run_loop::run(run_loop::LoopContext {
            guild_id: binding.guild_id.clone(),
            rx,
            cancel: cancel.clone(),
            task_pause: config.task_pause,
            emitter: Arc::clone(&emitter),
            stats: Arc::clone(&stats),
            state: Arc::clone(&state),
        }));

        info!(
            guild_id = %binding.guild_id,
            voice_channel_id = %binding.voice_channel_id,
            text_channel_id = %binding.text_channel_id,
            capacity = config.queue_capacity,
            "Worker started"
        );
        emitter.emit(WorkerEvent::WorkerStarted {
            guild_id: binding.guild_id.clone(),
        });

        Self {
            binding,
            tx,
            cancel,
            state,
            handle: Some(handle),
            emitter,
            stats,
        }
    }

    /// Channel pair this worker serves.
    pub const fn binding(&self) -> &ChannelBinding {
        &self.binding
    }

    pub const fn guild_id(&self) -> &GuildId {
        &self.binding.guild_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Follow the lifecycle state, including after the worker is stopped
    /// and gone from its registry.
    pub fn subscribe_state(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Append a task without waiting.
    ///
    /// A full or closing queue drops the task; the drop is logged, counted
    /// and emitted, never returned as an error.
    pub fn try_enqueue(&self, task: Task) -> EnqueueOutcome {
        let guild_id = self.guild_id();
        let task_id = task.id().to_string();

        match self.tx.try_send(task) {
            Ok(()) => {
                debug!(guild_id = %guild_id, task_id = %task_id, "Task queued");
                self.stats.record_queued();
                self.emitter.emit(WorkerEvent::TaskQueued {
                    guild_id: guild_id.clone(),
                    task_id,
                });
                EnqueueOutcome::Queued
            }
            Err(e) => {
                let reason = match e {
                    mpsc::error::TrySendError::Full(_) => "queue full",
                    mpsc::error::TrySendError::Closed(_) => "worker stopping",
                };
                warn!(guild_id = %guild_id, task_id = %task_id, reason, "Task dropped");
                self.stats.record_dropped();
                self.emitter.emit(WorkerEvent::TaskDropped {
                    guild_id: guild_id.clone(),
                    task_id,
                });
                EnqueueOutcome::Dropped
            }
        }
    }

    /// Cancel the loop and wait for it to exit.
    ///
    /// An in-flight task is allowed to finish; everything still queued is
    /// discarded. Returns the number of discarded tasks.
    pub async fn stop(mut self) -> usize {
        let guild_id = self.guild_id().clone();
        self.state.send_replace(RunState::Stopping);
        self.cancel.cancel();

        let discarded = match self.handle.take() {
            Some(handle) => match handle.await {
                Ok(discarded) => discarded,
                Err(e) => {
                    error!(guild_id = %guild_id, error = %e, "Worker loop did not exit cleanly");
                    0
                }
            },
            None => 0,
        };

        self.state.send_replace(RunState::Stopped);
        info!(guild_id = %guild_id, discarded, "Worker stopped");
        discarded
    }
}

impl Drop for GuildWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for GuildWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuildWorker")
            .field("binding", &self.binding)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::{mpsc as tmpsc, oneshot};
    use tokio_test::{assert_pending, assert_ready};

    use crate::task::TaskError;

    #[derive(Default)]
    struct RecordingEmitter {
        events: Mutex<Vec<WorkerEvent>>,
    }

    impl RecordingEmitter {
        fn count(&self, pred: impl Fn(&WorkerEvent) -> bool) -> usize {
            self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
        }
    }

    impl WorkerEventEmitter for RecordingEmitter {
        fn emit(&self, event: WorkerEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn binding() -> ChannelBinding {
        ChannelBinding::new("G1", "voice-1", "text-1")
    }

    fn config(capacity: usize) -> WorkerConfig {
        WorkerConfig {
            queue_capacity: capacity,
            task_pause: Duration::ZERO,
        }
    }

    fn spawn(capacity: usize) -> (GuildWorker, Arc<RecordingEmitter>, Arc<WorkerStats>) {
        let emitter = Arc::new(RecordingEmitter::default());
        let stats = Arc::new(WorkerStats::new());
        let worker = GuildWorker::spawn(
            binding(),
            &config(capacity),
            emitter.clone(),
            Arc::clone(&stats),
        );
        (worker, emitter, stats)
    }

    fn counting_task(id: &str, counter: &Arc<AtomicUsize>) -> Task {
        let counter = Arc::clone(counter);
        Task::new(id, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[tokio::test]
    async fn tasks_run_in_enqueue_order() {
        let (worker, emitter, _) = spawn(32);
        let (done_tx, mut done_rx) = tmpsc::unbounded_channel();

        for id in ["T1", "T2", "T3"] {
            let done_tx = done_tx.clone();
            let outcome = worker.try_enqueue(Task::new(id, move || async move {
                done_tx.send(id).ok();
                Ok(())
            }));
            assert_eq!(outcome, EnqueueOutcome::Queued);
        }

        let mut order = Vec::new();
        for _ in 0..3 {
            order.push(done_rx.recv().await.unwrap());
        }
        assert_eq!(order, ["T1", "T2", "T3"]);

        worker.stop().await;
        assert_eq!(
            emitter.count(|e| matches!(e, WorkerEvent::TaskFinished { .. })),
            3
        );
    }

    #[tokio::test]
    async fn overflow_drops_newest_without_blocking() {
        let (worker, emitter, stats) = spawn(32);
        let executed = Arc::new(AtomicUsize::new(0));

        // Nothing awaits between these calls, so the loop cannot drain yet.
        let outcomes: Vec<_> = (0..40)
            .map(|i| worker.try_enqueue(counting_task(&format!("T{i}"), &executed)))
            .collect();

        let queued = outcomes
            .iter()
            .filter(|o| **o == EnqueueOutcome::Queued)
            .count();
        assert_eq!(queued, 32);
        assert!(
            outcomes[32..]
                .iter()
                .all(|o| *o == EnqueueOutcome::Dropped)
        );
        assert_eq!(
            emitter.count(|e| matches!(e, WorkerEvent::TaskDropped { .. })),
            8
        );
        assert_eq!(stats.snapshot().dropped, 8);

        worker.stop().await;
    }

    #[tokio::test]
    async fn stop_discards_pending_tasks() {
        let (worker, emitter, stats) = spawn(32);
        let executed = Arc::new(AtomicUsize::new(0));

        worker.try_enqueue(counting_task("T1", &executed));
        worker.try_enqueue(counting_task("T2", &executed));
        let discarded = worker.stop().await;

        assert_eq!(discarded, 2);
        assert_eq!(executed.load(Ordering::SeqCst), 0);
        assert_eq!(
            emitter.count(|e| matches!(e, WorkerEvent::TaskDiscarded { .. })),
            2
        );
        assert_eq!(stats.snapshot().discarded, 2);
        assert_eq!(
            emitter.count(|e| matches!(e, WorkerEvent::WorkerStopped { discarded: 2, .. })),
            1
        );
    }

    #[tokio::test]
    async fn failing_and_panicking_tasks_do_not_kill_the_loop() {
        let (worker, emitter, stats) = spawn(32);
        let (done_tx, mut done_rx) = tmpsc::unbounded_channel();

        worker.try_enqueue(Task::new("fails", || async {
            Err(TaskError::Other(anyhow::anyhow!("backend unavailable")))
        }));
        worker.try_enqueue(Task::new("panics", || async {
            panic!("unexpected fault");
        }));
        worker.try_enqueue(Task::new("after", move || async move {
            done_tx.send(()).ok();
            Ok(())
        }));

        done_rx.recv().await.unwrap();
        assert_eq!(worker.state(), RunState::Running);
        worker.stop().await;

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.executed, 3);
        assert_eq!(snapshot.failed, 2);
        assert_eq!(
            emitter.count(|e| matches!(e, WorkerEvent::TaskFailed { .. })),
            2
        );
    }

    #[tokio::test]
    async fn stop_waits_for_in_flight_task() {
        let (worker, _, _) = spawn(32);
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let executed = Arc::new(AtomicUsize::new(0));

        worker.try_enqueue(Task::new("slow", move || async move {
            started_tx.send(()).ok();
            release_rx.await.ok();
            Ok(())
        }));
        worker.try_enqueue(counting_task("pending", &executed));
        started_rx.await.unwrap();

        let mut state = worker.subscribe_state();
        let mut stop = tokio_test::task::spawn(worker.stop());
        assert_pending!(stop.poll());
        assert_eq!(*state.borrow_and_update(), RunState::Stopping);

        release_tx.send(()).unwrap();
        for _ in 0..16 {
            if stop.is_woken() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let discarded = assert_ready!(stop.poll());

        assert_eq!(discarded, 1);
        assert_eq!(executed.load(Ordering::SeqCst), 0);
        assert_eq!(*state.borrow(), RunState::Stopped);
    }

    #[tokio::test]
    async fn dropped_worker_still_reaches_stopped() {
        let (worker, emitter, _) = spawn(4);
        let mut state = worker.subscribe_state();
        drop(worker);

        state
            .wait_for(|s| *s == RunState::Stopped)
            .await
            .unwrap();
        assert_eq!(
            emitter.count(|e| matches!(e, WorkerEvent::WorkerStopped { .. })),
            1
        );
    }

    #[tokio::test]
    async fn enqueue_after_stop_is_dropped() {
        let (worker, emitter, _) = spawn(4);
        let tx = worker.tx.clone();
        worker.stop().await;

        // The loop closed its receiver; any straggler send is rejected.
        assert!(tx.try_send(Task::new("late", || async { Ok(()) })).is_err());
        assert_eq!(
            emitter.count(|e| matches!(e, WorkerEvent::WorkerStopped { .. })),
            1
        );
    }

    #[tokio::test]
    async fn config_follows_settings() {
        let mut settings = BotSettings::with_defaults();
        settings.queue_capacity = 8;
        settings.task_pause = Duration::from_millis(250);
        let config = WorkerConfig::from(&settings);

        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.task_pause, Duration::from_millis(250));
    }
}
