//! Repository implementations backed by `SQLite`.

mod sqlite_preference_repository;

pub use sqlite_preference_repository::SqlitePreferenceRepository;
