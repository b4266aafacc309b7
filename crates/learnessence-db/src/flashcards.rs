//! Flashcard set repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use learnessence_core::{
    CreateFlashcardSetRequest, Error, Flashcard, FlashcardRepository, FlashcardSet,
    FlashcardSetSummary, FlashcardSetWithCards, Page, Result,
};

/// PostgreSQL implementation of FlashcardRepository.
pub struct PgFlashcardRepository {
    pool: Pool<Postgres>,
}

impl PgFlashcardRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn cards_for_set(&self, set_id: Uuid) -> Result<Vec<Flashcard>> {
        // v7 ids break ties between cards inserted in the same transaction.
        let rows = sqlx::query(
            r#"
            SELECT id, set_id, front, back, created_at
            FROM flashcards
            WHERE set_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(card_from_row).collect())
    }
}

fn set_from_row(r: &PgRow) -> FlashcardSet {
    FlashcardSet {
        id: r.get("id"),
        title: r.get("title"),
        user_id: r.get("user_id"),
        note_id: r.get("note_id"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn card_from_row(r: &PgRow) -> Flashcard {
    Flashcard {
        id: r.get("id"),
        set_id: r.get("set_id"),
        front: r.get("front"),
        back: r.get("back"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl FlashcardRepository for PgFlashcardRepository {
    async fn create_set(&self, req: CreateFlashcardSetRequest) -> Result<FlashcardSetWithCards> {
        let set_id = Uuid::now_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(
            r#"
            INSERT INTO flashcard_sets (id, title, user_id, note_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, title, user_id, note_id, created_at, updated_at
            "#,
        )
        .bind(set_id)
        .bind(&req.title)
        .bind(req.user_id)
        .bind(req.note_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;
        let set = set_from_row(&row);

        let mut cards = Vec::with_capacity(req.cards.len());
        for card in &req.cards {
            let row = sqlx::query(
                r#"
                INSERT INTO flashcards (id, set_id, front, back, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, set_id, front, back, created_at
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(set_id)
            .bind(&card.front)
            .bind(&card.back)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;
            cards.push(card_from_row(&row));
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "flashcards",
            op = "create_set",
            set_id = %set_id,
            user_id = %req.user_id,
            result_count = cards.len(),
            "Flashcard set created"
        );

        Ok(FlashcardSetWithCards { set, cards })
    }

    async fn get_set(&self, id: Uuid) -> Result<Option<FlashcardSet>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, user_id, note_id, created_at, updated_at
            FROM flashcard_sets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(set_from_row))
    }

    async fn get_set_with_cards(&self, id: Uuid) -> Result<Option<FlashcardSetWithCards>> {
        let Some(set) = self.get_set(id).await? else {
            return Ok(None);
        };
        let cards = self.cards_for_set(id).await?;
        Ok(Some(FlashcardSetWithCards { set, cards }))
    }

    async fn list_sets_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Vec<FlashcardSetSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.title, s.user_id, s.note_id, s.created_at, s.updated_at,
                   COALESCE((SELECT COUNT(*) FROM flashcards f WHERE f.set_id = s.id), 0) AS card_count
            FROM flashcard_sets s
            WHERE s.user_id = $1
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

        Ok(rows
            .iter()
            .map(|r| FlashcardSetSummary {
                set: set_from_row(r),
                card_count: r.get("card_count"),
            })
            .collect())
    }

    async fn delete_set(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM flashcard_sets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::FlashcardSetNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "flashcards",
            op = "delete_set",
            set_id = %id,
            "Flashcard set deleted"
        );
        Ok(())
    }
}
