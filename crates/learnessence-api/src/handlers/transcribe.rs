//! Audio transcription.
//!
//! Accepts `multipart/form-data` with:
//! - `file`: the audio (required, at most `MAX_UPLOAD_BYTES`)
//! - `language`: language hint passed to the service (optional)
//! - `noteId`: an owned note to attach the transcription to (optional)

use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use learnessence_core::CreateTranscriptionRequest;
use learnessence_inference::{AudioUpload, TranscriptionBackend, TranscriptionSegment};

use super::non_blank;
use crate::auth::AuthUser;
use crate::ownership::owned_note;
use crate::{ApiError, AppState};

const DEFAULT_FILE_NAME: &str = "audio.webm";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub text: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub segments: Vec<TranscriptionSegment>,
    /// Set when the transcription was stored against a note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription_id: Option<Uuid>,
}

const MIB: usize = 1024 * 1024;
const KIB: usize = 1024;

/// Human-readable upload limit: whole megabytes when exact, otherwise
/// kilobytes rounded up.
fn format_limit(max_bytes: usize) -> String {
    if max_bytes >= MIB && max_bytes % MIB == 0 {
        format!("{}MB", max_bytes / MIB)
    } else {
        format!("{}KB", max_bytes.div_ceil(KIB))
    }
}

fn too_large(max_bytes: usize) -> ApiError {
    ApiError::PayloadTooLarge(format!(
        "File too large. Max {} allowed.",
        format_limit(max_bytes)
    ))
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes)
    } else {
        ApiError::BadRequest(format!("Multipart error: {}", err.body_text()))
    }
}

pub async fn transcribe_audio(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let max_bytes = state.max_upload_bytes;

    let mut upload: Option<AudioUpload> = None;
    let mut language: Option<String> = None;
    let mut note_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
                let mime_type = field
                    .content_type()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;
                upload = Some(AudioUpload {
                    data: data.to_vec(),
                    file_name,
                    mime_type,
                });
            }
            Some("language") => {
                language = non_blank(Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, max_bytes))?,
                ));
            }
            Some("noteId") => {
                note_id = non_blank(Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, max_bytes))?,
                ));
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if upload.data.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    let backend: Arc<dyn TranscriptionBackend> = state
        .transcriber
        .clone()
        .ok_or_else(|| ApiError::internal("Transcription backend not configured"))?;

    // Check the note before spending an upstream call on it.
    let note = match note_id {
        Some(raw) => {
            let id = raw
                .trim()
                .parse::<Uuid>()
                .map_err(|_| ApiError::BadRequest("Invalid noteId".to_string()))?;
            Some(owned_note(&state, &auth, id).await?)
        }
        None => None,
    };

    let audio_bytes = upload.data.len();
    let start = Instant::now();
    let result = backend
        .transcribe(upload, language.as_deref())
        .await
        .map_err(|e| {
            warn!(
                subsystem = "api",
                component = "transcribe",
                user_id = %auth.user_id,
                audio_bytes,
                error = %e,
                "Transcription failed"
            );
            ApiError::from(e)
        })?;

    let transcription_id = match &note {
        Some(note) => {
            let stored = state
                .transcriptions
                .insert(CreateTranscriptionRequest {
                    note_id: note.id,
                    text: result.text.clone(),
                    language: result.language.clone(),
                    duration_secs: result.duration,
                    model: backend.model_name().to_string(),
                })
                .await?;
            Some(stored.id)
        }
        None => None,
    };

    info!(
        subsystem = "api",
        component = "transcribe",
        op = "transcribe",
        user_id = %auth.user_id,
        audio_bytes,
        model = backend.model_name(),
        stored = transcription_id.is_some(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Audio transcribed"
    );

    Ok(Json(TranscribeResponse {
        text: result.text,
        language: result.language,
        duration: result.duration,
        segments: result.segments,
        transcription_id,
    }))
}
