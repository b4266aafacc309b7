//! Summaries of notes or raw text.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use learnessence_core::{
    text, CreateNoteRequest, CreateSummaryRequest, NoteSourceType, Summary, SummaryStyle,
    SummaryWithNote,
};
use learnessence_inference::AgentOutcome;

use super::{non_blank, ListQuery};
use crate::auth::AuthUser;
use crate::ownership::linked_note;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSummaryBody {
    pub text: Option<String>,
    pub note_id: Option<String>,
    pub style: Option<String>,
}

pub async fn list_summaries(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SummaryWithNote>>, ApiError> {
    let page = query.page_for(&auth)?;
    let summaries = state.summaries.list_for_user(auth.user_id, page).await?;
    Ok(Json(summaries))
}

/// Summarize an existing note, or raw text saved as a new note.
///
/// Generation runs before an implicit note is created, so a rejected or
/// failed generation leaves nothing behind.
pub async fn create_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateSummaryBody>,
) -> Result<(StatusCode, Json<Summary>), ApiError> {
    let text = non_blank(body.text);
    let note_id = non_blank(body.note_id);
    if text.is_none() && note_id.is_none() {
        return Err(ApiError::BadRequest("Missing text or noteId".to_string()));
    }

    let style = match non_blank(body.style) {
        Some(raw) => raw.parse::<SummaryStyle>()?,
        None => SummaryStyle::default(),
    };

    let existing = match note_id {
        Some(raw) => Some(linked_note(&state, &auth, &raw).await?),
        None => None,
    };

    let source = text
        .or_else(|| existing.as_ref().map(|note| note.content.clone()))
        .ok_or_else(|| ApiError::BadRequest("Missing text or noteId".to_string()))?;

    let content = match state.agents.as_ref() {
        Some(agents) => match agents.summary.generate(&source, style).await {
            Ok(AgentOutcome::Generated(generated)) => non_blank(generated.content),
            Ok(AgentOutcome::Blocked { reason }) => {
                return Err(ApiError::Rejected {
                    error: "Content blocked".to_string(),
                    message: reason,
                })
            }
            Err(e) => return Err(ApiError::from_agent_error(e, "Failed to generate summary")),
        },
        None => {
            debug!(
                subsystem = "api",
                component = "summaries",
                "No generation backend, using sentence heuristic"
            );
            non_blank(Some(text::naive_summary(&source)))
        }
    }
    .unwrap_or_else(|| source.clone());

    let note = match existing {
        Some(note) => note,
        None => {
            state
                .notes
                .insert(CreateNoteRequest {
                    user_id: auth.user_id,
                    title: text::title_from_text(&source),
                    content: source.clone(),
                    source_type: NoteSourceType::Text,
                })
                .await?
        }
    };

    let summary = state
        .summaries
        .insert(CreateSummaryRequest {
            user_id: auth.user_id,
            note_id: note.id,
            content,
            style,
        })
        .await?;

    info!(
        subsystem = "api",
        component = "summaries",
        op = "create",
        user_id = %auth.user_id,
        note_id = %note.id,
        style = style.as_str(),
        "Summary created"
    );
    Ok((StatusCode::CREATED, Json(summary)))
}
