//! Core traits for LearnEssence abstractions.
//!
//! Repositories are implemented over PostgreSQL in `learnessence-db`;
//! generation backends live in `learnessence-inference`. Handlers depend only
//! on these traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note and return the stored record.
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Note>>;

    /// List a user's notes, newest first.
    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Note>>;

    /// Apply a partial update and return the updated note.
    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Permanently delete a note; summaries and transcriptions cascade.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository for flashcard sets and their cards.
#[async_trait]
pub trait FlashcardRepository: Send + Sync {
    /// Create a set and all of its cards atomically.
    async fn create_set(&self, req: CreateFlashcardSetRequest) -> Result<FlashcardSetWithCards>;

    /// Fetch a set without its cards.
    async fn get_set(&self, id: Uuid) -> Result<Option<FlashcardSet>>;

    /// Fetch a set with its cards ordered by creation time ascending.
    async fn get_set_with_cards(&self, id: Uuid) -> Result<Option<FlashcardSetWithCards>>;

    /// List a user's sets with card counts, newest first.
    async fn list_sets_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Vec<FlashcardSetSummary>>;

    /// Delete a set; its cards cascade.
    async fn delete_set(&self, id: Uuid) -> Result<()>;
}

/// Repository for note summaries.
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    async fn insert(&self, req: CreateSummaryRequest) -> Result<Summary>;

    /// List summaries of notes owned by the user, newest first.
    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<SummaryWithNote>>;
}

/// Repository for audio transcriptions attached to notes.
#[async_trait]
pub trait TranscriptionRepository: Send + Sync {
    async fn insert(&self, req: CreateTranscriptionRequest) -> Result<Transcription>;

    /// Transcriptions of a note, newest first.
    async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<Transcription>>;
}

/// Session lookup used by the authentication extractor.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Resolve a session token. Expired sessions resolve to `None`.
    async fn find_by_token(&self, token: &str) -> Result<Option<AuthSession>>;
}

/// Aggregate counts for the dashboard.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text from a prompt.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    /// Generate a completion for a prompt under a system instruction.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model name used for generation.
    fn model_name(&self) -> &str;
}
