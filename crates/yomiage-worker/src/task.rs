//! The unit of work executed by a guild worker.

use std::fmt;
use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use thiserror::Error;

use yomiage_core::{GatewayError, GuildId, SpeechError};

/// Deferred body of a [`Task`].
pub type TaskAction = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), TaskError>> + Send>;

/// Reasons a task's action can fail.
///
/// Failures are terminal: the worker logs them and moves on to the next task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] SpeechError),

    /// The guild's voice connection disappeared while the worker was still
    /// alive. The idle reaper cleans such workers up eventually.
    #[error("Voice connection on guild {0} is gone, maybe zombie worker")]
    PlaybackTargetMissing(GuildId),

    #[error("Playback failed: {0}")]
    Playback(#[from] GatewayError),

    /// The action panicked; the worker contained it.
    #[error("Task panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// An identifier plus a deferred action.
///
/// Building a task has no side effects: the action closure is only invoked
/// by the worker loop, at most once.
pub struct Task {
    id: String,
    action: TaskAction,
}

impl Task {
    /// Create a task from an identifier and a zero-argument async action.
    pub fn new<F, Fut>(id: impl Into<String>, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            id: id.into(),
            action: Box::new(move || action().boxed()),
        }
    }

    /// Human-readable identifier, used in logs and events.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn into_parts(self) -> (String, TaskAction) {
        (self.id, self.action)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish_non_exhaustive()
    }
}
