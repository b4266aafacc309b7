//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use learnessence_core::{
    CreateNoteRequest, Error, Note, NoteRepository, Page, Result, UpdateNoteRequest,
};

const NOTE_COLUMNS: &str = "id, title, content, source_type, user_id, created_at, updated_at";

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn note_from_row(r: &PgRow) -> Result<Note> {
    let source_type: String = r.get("source_type");
    Ok(Note {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        source_type: source_type.parse()?,
        user_id: r.get("user_id"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO notes (id, title, content, source_type, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {NOTE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.source_type.as_str())
        .bind(req.user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = %id,
            user_id = %req.user_id,
            source_type = req.source_type.as_str(),
            "Note created"
        );
        note_from_row(&row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(note_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(note_from_row).collect()
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let now = Utc::now();

        // Build dynamic update query
        let mut updates = vec!["updated_at = $1".to_string()];
        let mut param_count = 2;

        if req.title.is_some() {
            updates.push(format!("title = ${}", param_count));
            param_count += 1;
        }
        if req.content.is_some() {
            updates.push(format!("content = ${}", param_count));
            param_count += 1;
        }

        let query = format!(
            "UPDATE notes SET {} WHERE id = ${} RETURNING {}",
            updates.join(", "),
            param_count,
            NOTE_COLUMNS
        );

        let mut q = sqlx::query(&query).bind(now);
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }

        let row = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;

        note_from_row(&row)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "notes",
            op = "delete",
            note_id = %id,
            "Note deleted"
        );
        Ok(())
    }
}
