//! Session lookup against the shared `sessions` table.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use learnessence_core::{AuthSession, Error, Result, SessionRepository};

/// PostgreSQL implementation of SessionRepository.
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<AuthSession>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, expires_at
            FROM sessions
            WHERE token = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| AuthSession {
            session_id: r.get("id"),
            user_id: r.get("user_id"),
            expires_at: r.get("expires_at"),
        }))
    }
}
