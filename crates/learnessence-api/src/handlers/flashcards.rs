//! Flashcard sets.
//!
//! Cards come from the flashcards agent when a generation backend is
//! configured, otherwise from the one-card-per-sentence heuristic.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use learnessence_core::{text, CreateFlashcardSetRequest, FlashcardSetSummary, FlashcardSetWithCards};
use learnessence_inference::AgentOutcome;

use super::{non_blank, success, ListQuery, SuccessResponse};
use crate::auth::AuthUser;
use crate::ownership::{ensure_owner, linked_note, owned_set, parse_record_id};
use crate::{ApiError, AppState};

const SET_NOT_FOUND: &str = "Flashcard set not found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlashcardsBody {
    pub text: Option<String>,
    pub title: Option<String>,
    pub note_id: Option<String>,
}

pub async fn list_flashcard_sets(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FlashcardSetSummary>>, ApiError> {
    let page = query.page_for(&auth)?;
    let sets = state
        .flashcards
        .list_sets_for_user(auth.user_id, page)
        .await?;
    Ok(Json(sets))
}

pub async fn create_flashcard_set(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateFlashcardsBody>,
) -> Result<(StatusCode, Json<FlashcardSetWithCards>), ApiError> {
    let text = non_blank(body.text)
        .ok_or_else(|| ApiError::BadRequest("Missing text".to_string()))?;

    let note_id = match non_blank(body.note_id) {
        Some(raw) => Some(linked_note(&state, &auth, &raw).await?.id),
        None => None,
    };

    let (generated_title, cards) = match state.agents.as_ref() {
        Some(agents) => match agents.flashcards.generate(&text).await {
            Ok(AgentOutcome::Generated(generated)) => {
                let title = non_blank(generated.title.clone());
                let cards = generated.into_cards();
                if cards.is_empty() {
                    debug!(
                        subsystem = "api",
                        component = "flashcards",
                        "Agent returned no cards, falling back to sentence heuristic"
                    );
                    (title, text::naive_flashcards(&text))
                } else {
                    (title, cards)
                }
            }
            Ok(AgentOutcome::Blocked { reason }) => {
                return Err(ApiError::Rejected {
                    error: "Content blocked".to_string(),
                    message: reason,
                })
            }
            Err(e) => return Err(ApiError::from_agent_error(e, "Failed to generate flashcards")),
        },
        None => {
            debug!(
                subsystem = "api",
                component = "flashcards",
                "No generation backend, using sentence heuristic"
            );
            (None, text::naive_flashcards(&text))
        }
    };

    let title = non_blank(body.title)
        .or(generated_title)
        .unwrap_or_else(|| text::default_title("Flashcards", Utc::now().date_naive()));

    let set = state
        .flashcards
        .create_set(CreateFlashcardSetRequest {
            user_id: auth.user_id,
            title,
            note_id,
            cards,
        })
        .await?;

    info!(
        subsystem = "api",
        component = "flashcards",
        op = "create_set",
        user_id = %auth.user_id,
        set_id = %set.set.id,
        result_count = set.cards.len(),
        "Flashcard set created"
    );
    Ok((StatusCode::CREATED, Json(set)))
}

pub async fn get_flashcard_set(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlashcardSetWithCards>, ApiError> {
    let id = parse_record_id(&id, SET_NOT_FOUND)?;
    let set = state
        .flashcards
        .get_set_with_cards(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(SET_NOT_FOUND.to_string()))?;
    ensure_owner(auth.user_id, set.set.user_id)?;
    Ok(Json(set))
}

pub async fn delete_flashcard_set(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_record_id(&id, SET_NOT_FOUND)?;
    owned_set(&state, &auth, id).await?;
    state.flashcards.delete_set(id).await?;

    info!(
        subsystem = "api",
        component = "flashcards",
        op = "delete_set",
        user_id = %auth.user_id,
        set_id = %id,
        "Flashcard set deleted"
    );
    Ok(success())
}
