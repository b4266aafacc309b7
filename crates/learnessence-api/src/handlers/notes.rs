//! Note CRUD, note generation from transcripts, and per-note transcriptions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use learnessence_core::{
    defaults, text, CreateNoteRequest, Note, NoteSourceType, Transcription, UpdateNoteRequest,
};
use learnessence_inference::AgentOutcome;

use super::{non_blank, success, ListQuery, SuccessResponse};
use crate::auth::AuthUser;
use crate::ownership::{owned_note, parse_record_id};
use crate::{ApiError, AppState};

const NOTE_NOT_FOUND: &str = "Note not found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub source_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateNoteBody {
    pub text: Option<String>,
}

pub async fn list_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let page = query.page_for(&auth)?;
    let notes = state.notes.list_for_user(auth.user_id, page).await?;
    Ok(Json(notes))
}

pub async fn create_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateNoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let content = non_blank(body.content)
        .ok_or_else(|| ApiError::BadRequest("Missing content".to_string()))?;
    let source_type = match non_blank(body.source_type) {
        Some(raw) => raw.parse::<NoteSourceType>()?,
        None => NoteSourceType::Text,
    };
    let title = non_blank(body.title).unwrap_or_else(|| defaults::UNTITLED_NOTE.to_string());

    let note = state
        .notes
        .insert(CreateNoteRequest {
            user_id: auth.user_id,
            title,
            content,
            source_type,
        })
        .await?;

    info!(
        subsystem = "api",
        component = "notes",
        op = "create",
        user_id = %auth.user_id,
        note_id = %note.id,
        "Note created"
    );
    Ok((StatusCode::CREATED, Json(note)))
}

/// Turn a voice transcript into a note with the notes agent.
pub async fn generate_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<GenerateNoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let text = body
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing text".to_string()))?;

    let received = text.chars().count();
    if received < defaults::MIN_TRANSCRIPT_CHARS {
        return Err(ApiError::Rejected {
            error: "Transcript too short".to_string(),
            message: format!(
                "Transcript must be at least {} characters. Received {} characters.",
                defaults::MIN_TRANSCRIPT_CHARS,
                received
            ),
        });
    }

    let agents = state.agents.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Generation backend not configured".to_string())
    })?;

    let generated = match agents.notes.generate(&text).await {
        Ok(AgentOutcome::Generated(note)) => note,
        Ok(AgentOutcome::Blocked { reason }) => {
            return Err(ApiError::Rejected {
                error: "Content blocked".to_string(),
                message: reason,
            })
        }
        Err(e) => return Err(ApiError::from_agent_error(e, "Failed to generate note")),
    };

    let title = non_blank(generated.title).unwrap_or_else(|| {
        debug!(
            subsystem = "api",
            component = "notes",
            "Generated note has no title, using dated default"
        );
        text::default_title("Voice Note", Utc::now().date_naive())
    });

    let note = state
        .notes
        .insert(CreateNoteRequest {
            user_id: auth.user_id,
            title,
            content: generated.content.unwrap_or_default(),
            source_type: NoteSourceType::Voice,
        })
        .await?;

    info!(
        subsystem = "api",
        component = "notes",
        op = "generate",
        user_id = %auth.user_id,
        note_id = %note.id,
        transcript_chars = received,
        "Note generated"
    );
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_record_id(&id, NOTE_NOT_FOUND)?;
    let note = owned_note(&state, &auth, id).await?;
    Ok(Json(note))
}

pub async fn update_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_record_id(&id, NOTE_NOT_FOUND)?;
    owned_note(&state, &auth, id).await?;

    let note = state
        .notes
        .update(
            id,
            UpdateNoteRequest {
                title: body.title,
                content: body.content,
            },
        )
        .await?;
    Ok(Json(note))
}

pub async fn delete_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_record_id(&id, NOTE_NOT_FOUND)?;
    owned_note(&state, &auth, id).await?;
    state.notes.delete(id).await?;

    info!(
        subsystem = "api",
        component = "notes",
        op = "delete",
        user_id = %auth.user_id,
        note_id = %id,
        "Note deleted"
    );
    Ok(success())
}

pub async fn list_note_transcriptions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Transcription>>, ApiError> {
    let id = parse_record_id(&id, NOTE_NOT_FOUND)?;
    owned_note(&state, &auth, id).await?;
    let transcriptions = state.transcriptions.list_for_note(id).await?;
    Ok(Json(transcriptions))
}
