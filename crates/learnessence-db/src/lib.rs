//! # learnessence-db
//!
//! PostgreSQL database layer for LearnEssence.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notes, flashcards, summaries,
//!   transcriptions, sessions and dashboard stats
//! - Embedded migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use learnessence_db::{CreateNoteRequest, Database, NoteRepository, NoteSourceType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/learnessence").await?;
//!
//!     let note = db.notes.insert(CreateNoteRequest {
//!         user_id,
//!         title: "Photosynthesis".to_string(),
//!         content: "Plants convert light into chemical energy.".to_string(),
//!         source_type: NoteSourceType::Text,
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod flashcards;
pub mod notes;
pub mod pool;
pub mod sessions;
pub mod stats;
pub mod summaries;
pub mod transcriptions;

// Always compiled so integration tests (in tests/) can use the fixtures
pub mod test_fixtures;

// Re-export core types
pub use learnessence_core::*;

pub use flashcards::PgFlashcardRepository;
pub use notes::PgNoteRepository;
pub use pool::{connection_target, create_pool, log_pool_metrics, PoolConfig};
pub use sessions::PgSessionRepository;
pub use stats::PgStatsRepository;
pub use summaries::PgSummaryRepository;
pub use transcriptions::PgTranscriptionRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub notes: PgNoteRepository,
    pub flashcards: PgFlashcardRepository,
    pub summaries: PgSummaryRepository,
    pub transcriptions: PgTranscriptionRepository,
    /// Read-only view of the authentication service's sessions.
    pub sessions: PgSessionRepository,
    pub stats: PgStatsRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            flashcards: PgFlashcardRepository::new(pool.clone()),
            summaries: PgSummaryRepository::new(pool.clone()),
            transcriptions: PgTranscriptionRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            stats: PgStatsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url, PoolConfig::default()).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
