//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the worker and handler layers expect
//! from infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `sqlx`, `reqwest` or gateway-library types in any signature
//! - Intent-based methods (`is_alone_in_voice`) rather than raw state access
//! - Every fallible operation returns a port-level error enum

pub mod gateway;
pub mod preferences;
pub mod speech;
pub mod worker_events;

use thiserror::Error;

pub use gateway::{GatewayError, GatewayPort, JoinStatus, LeaveStatus};
pub use preferences::PreferenceRepository;
pub use speech::{OpusFrames, SpeechError, SpeechSynthesizer};
pub use worker_events::{NoopWorkerEmitter, WorkerEvent, WorkerEventEmitter};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for handlers to report storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),
}
