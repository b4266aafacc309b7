//! Transcription repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use learnessence_core::{
    CreateTranscriptionRequest, Error, Result, Transcription, TranscriptionRepository,
};

/// PostgreSQL implementation of TranscriptionRepository.
pub struct PgTranscriptionRepository {
    pool: Pool<Postgres>,
}

impl PgTranscriptionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn transcription_from_row(r: &PgRow) -> Transcription {
    Transcription {
        id: r.get("id"),
        note_id: r.get("note_id"),
        text: r.get("text"),
        language: r.get("language"),
        duration_secs: r.get("duration_secs"),
        model: r.get("model"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl TranscriptionRepository for PgTranscriptionRepository {
    async fn insert(&self, req: CreateTranscriptionRequest) -> Result<Transcription> {
        let row = sqlx::query(
            r#"
            INSERT INTO transcriptions (id, note_id, text, language, duration_secs, model, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, note_id, text, language, duration_secs, model, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(req.note_id)
        .bind(&req.text)
        .bind(&req.language)
        .bind(req.duration_secs)
        .bind(&req.model)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "transcriptions",
            op = "insert",
            note_id = %req.note_id,
            model = %req.model,
            "Transcription stored"
        );
        Ok(transcription_from_row(&row))
    }

    async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<Transcription>> {
        let rows = sqlx::query(
            r#"
            SELECT id, note_id, text, language, duration_secs, model, created_at
            FROM transcriptions
            WHERE note_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(transcription_from_row).collect())
    }
}
