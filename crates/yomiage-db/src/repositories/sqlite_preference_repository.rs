//! `SQLite` implementation of the `PreferenceRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use yomiage_core::{PreferenceRepository, RepositoryError, UserId};

/// `SQLite` implementation of the `PreferenceRepository` trait.
///
/// One row per user; each setter upserts a single column so the other
/// preference survives.
#[derive(Clone)]
pub struct SqlitePreferenceRepository {
    pool: SqlitePool,
}

impl SqlitePreferenceRepository {
    /// Create a new `SQLite` preference repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn read_column(
        &self,
        user: &UserId,
        column: Column,
    ) -> Result<Option<String>, RepositoryError> {
        let sql = match column {
            Column::Language => "SELECT language FROM users WHERE discord_id = ?",
            Column::VoiceToken => "SELECT voice_token FROM users WHERE discord_id = ?",
        };

        let value: Option<String> = sqlx::query_scalar(sql)
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(value.filter(|v| !v.is_empty()))
    }

    async fn upsert_column(
        &self,
        user: &UserId,
        column: Column,
        value: &str,
    ) -> Result<(), RepositoryError> {
        let sql = match column {
            Column::Language => {
                "INSERT INTO users (discord_id, language, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(discord_id) DO UPDATE SET
                     language = excluded.language,
                     updated_at = excluded.updated_at"
            }
            Column::VoiceToken => {
                "INSERT INTO users (discord_id, voice_token, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(discord_id) DO UPDATE SET
                     voice_token = excluded.voice_token,
                     updated_at = excluded.updated_at"
            }
        };
        let updated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        sqlx::query(sql)
            .bind(user.as_str())
            .bind(value)
            .bind(&updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        tracing::debug!(user_id = %user, column = column.name(), "Preference saved");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Language,
    VoiceToken,
}

impl Column {
    const fn name(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::VoiceToken => "voice_token",
        }
    }
}

#[async_trait]
impl PreferenceRepository for SqlitePreferenceRepository {
    async fn language(&self, user: &UserId) -> Result<Option<String>, RepositoryError> {
        self.read_column(user, Column::Language).await
    }

    async fn voice_identity(&self, user: &UserId) -> Result<Option<String>, RepositoryError> {
        self.read_column(user, Column::VoiceToken).await
    }

    async fn set_language(&self, user: &UserId, language: &str) -> Result<(), RepositoryError> {
        self.upsert_column(user, Column::Language, language).await
    }

    async fn set_voice_identity(
        &self,
        user: &UserId,
        identity: &str,
    ) -> Result<(), RepositoryError> {
        self.upsert_column(user, Column::VoiceToken, identity).await
    }
}
