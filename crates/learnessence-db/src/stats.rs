//! Dashboard counters.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use learnessence_core::{Error, Result, StatsRepository, UserStats};

/// PostgreSQL implementation of StatsRepository.
pub struct PgStatsRepository {
    pool: Pool<Postgres>,
}

impl PgStatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM notes WHERE user_id = $1) AS notes,
                (SELECT COUNT(*) FROM flashcard_sets WHERE user_id = $1) AS flashcard_sets,
                (SELECT COUNT(*) FROM flashcards f
                    JOIN flashcard_sets s ON s.id = f.set_id
                    WHERE s.user_id = $1) AS flashcards,
                (SELECT COUNT(*) FROM summaries WHERE user_id = $1) AS summaries,
                (SELECT COUNT(*) FROM transcriptions t
                    JOIN notes n ON n.id = t.note_id
                    WHERE n.user_id = $1) AS transcriptions
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(UserStats {
            notes: row.get("notes"),
            flashcard_sets: row.get("flashcard_sets"),
            flashcards: row.get("flashcards"),
            summaries: row.get("summaries"),
            transcriptions: row.get("transcriptions"),
        })
    }
}
