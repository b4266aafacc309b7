//! Record ownership checks.
//!
//! Single-record routes answer 404 for a missing record before they answer
//! 403 for someone else's.

use uuid::Uuid;

use learnessence_core::{FlashcardSet, Note};

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

pub fn ensure_owner(session_user: Uuid, record_owner: Uuid) -> Result<(), ApiError> {
    if session_user == record_owner {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Parse a path id. Malformed ids cannot name a record, so they are reported
/// with the same 404 as a missing one.
pub fn parse_record_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::NotFound(not_found.to_string()))
}

/// Load a note the caller owns.
pub async fn owned_note(state: &AppState, auth: &AuthUser, id: Uuid) -> Result<Note, ApiError> {
    let note = state
        .notes
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;
    ensure_owner(auth.user_id, note.user_id)?;
    Ok(note)
}

/// Resolve a `noteId` from a request body that links a new record to a note.
/// Malformed, unknown and foreign ids are all refused with 403.
pub async fn linked_note(state: &AppState, auth: &AuthUser, raw: &str) -> Result<Note, ApiError> {
    let id = raw.parse::<Uuid>().map_err(|_| ApiError::Forbidden)?;
    let note = state.notes.get(id).await?.ok_or(ApiError::Forbidden)?;
    ensure_owner(auth.user_id, note.user_id)?;
    Ok(note)
}

/// Load a flashcard set (without cards) the caller owns.
pub async fn owned_set(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<FlashcardSet, ApiError> {
    let set = state
        .flashcards
        .get_set(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flashcard set not found".to_string()))?;
    ensure_owner(auth.user_id, set.user_id)?;
    Ok(set)
}
