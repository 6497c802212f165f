//! SQLite persistence for yomiage.
//!
//! Holds the per-user speech preferences (language and voice identity)
//! behind the [`PreferenceRepository`](yomiage_core::PreferenceRepository)
//! port.

#![deny(unsafe_code)]

pub mod repositories;
pub mod setup;

pub use repositories::SqlitePreferenceRepository;

pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
