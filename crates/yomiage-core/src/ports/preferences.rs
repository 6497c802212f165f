//! Per-user preference store port.
//!
//! Read/write by user key, last write wins. No transactions.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::UserId;

/// Repository for per-user speech preferences.
///
/// # Design Rules
///
/// - No `sqlx` types in signatures
/// - Absent and empty values both read back as `None`
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Preferred language tag (e.g. `ja-JP`).
    async fn language(&self, user: &UserId) -> Result<Option<String>, RepositoryError>;

    /// Voice identity used to derive the voice profile.
    async fn voice_identity(&self, user: &UserId) -> Result<Option<String>, RepositoryError>;

    /// Insert or update the user's language.
    async fn set_language(&self, user: &UserId, language: &str) -> Result<(), RepositoryError>;

    /// Insert or update the user's voice identity.
    async fn set_voice_identity(
        &self,
        user: &UserId,
        identity: &str,
    ) -> Result<(), RepositoryError>;
}
