//! Summary repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use learnessence_core::{
    CreateSummaryRequest, Error, NoteRef, Page, Result, Summary, SummaryRepository,
    SummaryWithNote,
};

/// PostgreSQL implementation of SummaryRepository.
pub struct PgSummaryRepository {
    pool: Pool<Postgres>,
}

impl PgSummaryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn summary_from_row(r: &PgRow) -> Result<Summary> {
    let style: String = r.get("style");
    Ok(Summary {
        id: r.get("id"),
        content: r.get("content"),
        style: style.parse()?,
        note_id: r.get("note_id"),
        user_id: r.get("user_id"),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl SummaryRepository for PgSummaryRepository {
    async fn insert(&self, req: CreateSummaryRequest) -> Result<Summary> {
        let id = Uuid::now_v7();

        let row = sqlx::query(
            r#"
            INSERT INTO summaries (id, content, style, note_id, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, content, style, note_id, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(&req.content)
        .bind(req.style.as_str())
        .bind(req.note_id)
        .bind(req.user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "summaries",
            op = "insert",
            note_id = %req.note_id,
            style = req.style.as_str(),
            "Summary created"
        );
        summary_from_row(&row)
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<SummaryWithNote>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.content, s.style, s.note_id, s.user_id, s.created_at,
                   n.title AS note_title
            FROM summaries s
            JOIN notes n ON n.id = s.note_id
            WHERE n.user_id = $1
            ORDER BY s.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter()
            .map(|r| {
                let summary = summary_from_row(r)?;
                let note = NoteRef {
                    id: summary.note_id,
                    title: r.get("note_title"),
                };
                Ok(SummaryWithNote { summary, note })
            })
            .collect()
    }
}
