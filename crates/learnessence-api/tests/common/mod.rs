//! Shared harness for API integration tests: an in-memory store behind every
//! repository trait and helpers for driving the router with `oneshot`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use learnessence_api::{build_router, AppState, Repositories};
use learnessence_core::*;
use learnessence_inference::mock::{MockGenerationBackend, MockTranscriptionBackend};
use learnessence_inference::StudyAgents;

pub const COOKIE_NAME: &str = "learnessence.session_token";

/// Text long enough to pass note generation and the educational guardrail.
pub const LECTURE: &str = "Today's lecture covers cellular respiration. We will study how cells \
    convert glucose into ATP, examine the role of mitochondria, and discuss the difference \
    between aerobic and anaerobic processes. The concept of the electron transport chain is \
    central to understanding this process.";

#[derive(Default)]
struct StoreData {
    notes: Vec<Note>,
    sets: Vec<FlashcardSet>,
    cards: Vec<Flashcard>,
    summaries: Vec<Summary>,
    transcriptions: Vec<Transcription>,
    sessions: HashMap<String, AuthSession>,
}

/// In-memory stand-in for the PostgreSQL repositories.
#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<StoreData>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a live session and return its user id.
    pub fn add_session(&self, token: &str) -> Uuid {
        let user_id = Uuid::now_v7();
        self.add_session_for(token, user_id, Utc::now() + Duration::hours(1));
        user_id
    }

    pub fn add_session_for(&self, token: &str, user_id: Uuid, expires_at: chrono::DateTime<Utc>) {
        self.data.lock().unwrap().sessions.insert(
            token.to_string(),
            AuthSession {
                session_id: Uuid::now_v7(),
                user_id,
                expires_at,
            },
        );
    }

    pub fn notes(&self) -> Vec<Note> {
        self.data.lock().unwrap().notes.clone()
    }

    pub fn sets(&self) -> Vec<FlashcardSet> {
        self.data.lock().unwrap().sets.clone()
    }

    pub fn summaries(&self) -> Vec<Summary> {
        self.data.lock().unwrap().summaries.clone()
    }

    pub fn transcriptions(&self) -> Vec<Transcription> {
        self.data.lock().unwrap().transcriptions.clone()
    }
}

fn page_of<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            title: req.title,
            content: req.content,
            source_type: req.source_type,
            user_id: req.user_id,
            created_at: now,
            updated_at: now,
        };
        self.data.lock().unwrap().notes.push(note.clone());
        Ok(note)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Note>> {
        let data = self.data.lock().unwrap();
        let mut notes: Vec<Note> = data
            .notes
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page_of(notes, page))
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let mut data = self.data.lock().unwrap();
        let note = data
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(content) = req.content {
            note.content = content;
        }
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        let before = data.notes.len();
        data.notes.retain(|n| n.id != id);
        if data.notes.len() == before {
            return Err(Error::NoteNotFound(id));
        }
        data.summaries.retain(|s| s.note_id != id);
        data.transcriptions.retain(|t| t.note_id != id);
        for set in data.sets.iter_mut().filter(|s| s.note_id == Some(id)) {
            set.note_id = None;
        }
        Ok(())
    }
}

#[async_trait]
impl FlashcardRepository for InMemoryStore {
    async fn create_set(&self, req: CreateFlashcardSetRequest) -> Result<FlashcardSetWithCards> {
        let now = Utc::now();
        let set = FlashcardSet {
            id: Uuid::now_v7(),
            title: req.title,
            user_id: req.user_id,
            note_id: req.note_id,
            created_at: now,
            updated_at: now,
        };
        let cards: Vec<Flashcard> = req
            .cards
            .into_iter()
            .map(|c| Flashcard {
                id: Uuid::now_v7(),
                set_id: set.id,
                front: c.front,
                back: c.back,
                created_at: now,
            })
            .collect();

        let mut data = self.data.lock().unwrap();
        data.sets.push(set.clone());
        data.cards.extend(cards.iter().cloned());
        Ok(FlashcardSetWithCards { set, cards })
    }

    async fn get_set(&self, id: Uuid) -> Result<Option<FlashcardSet>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .sets
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn get_set_with_cards(&self, id: Uuid) -> Result<Option<FlashcardSetWithCards>> {
        let data = self.data.lock().unwrap();
        let Some(set) = data.sets.iter().find(|s| s.id == id).cloned() else {
            return Ok(None);
        };
        let mut cards: Vec<Flashcard> = data
            .cards
            .iter()
            .filter(|c| c.set_id == id)
            .cloned()
            .collect();
        // Stable sort: cards of one set share a timestamp and keep insertion order.
        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(Some(FlashcardSetWithCards { set, cards }))
    }

    async fn list_sets_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Vec<FlashcardSetSummary>> {
        let data = self.data.lock().unwrap();
        let mut sets: Vec<FlashcardSetSummary> = data
            .sets
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| FlashcardSetSummary {
                set: s.clone(),
                card_count: data.cards.iter().filter(|c| c.set_id == s.id).count() as i64,
            })
            .collect();
        sets.sort_by(|a, b| {
            b.set
                .created_at
                .cmp(&a.set.created_at)
                .then(b.set.id.cmp(&a.set.id))
        });
        Ok(page_of(sets, page))
    }

    async fn delete_set(&self, id: Uuid) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        let before = data.sets.len();
        data.sets.retain(|s| s.id != id);
        if data.sets.len() == before {
            return Err(Error::FlashcardSetNotFound(id));
        }
        data.cards.retain(|c| c.set_id != id);
        Ok(())
    }
}

#[async_trait]
impl SummaryRepository for InMemoryStore {
    async fn insert(&self, req: CreateSummaryRequest) -> Result<Summary> {
        let summary = Summary {
            id: Uuid::now_v7(),
            content: req.content,
            style: req.style,
            note_id: req.note_id,
            user_id: req.user_id,
            created_at: Utc::now(),
        };
        self.data.lock().unwrap().summaries.push(summary.clone());
        Ok(summary)
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<SummaryWithNote>> {
        let data = self.data.lock().unwrap();
        let mut rows: Vec<SummaryWithNote> = data
            .summaries
            .iter()
            .filter_map(|s| {
                let note = data
                    .notes
                    .iter()
                    .find(|n| n.id == s.note_id && n.user_id == user_id)?;
                Some(SummaryWithNote {
                    summary: s.clone(),
                    note: NoteRef {
                        id: note.id,
                        title: note.title.clone(),
                    },
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .created_at
                .cmp(&a.summary.created_at)
                .then(b.summary.id.cmp(&a.summary.id))
        });
        Ok(page_of(rows, page))
    }
}

#[async_trait]
impl TranscriptionRepository for InMemoryStore {
    async fn insert(&self, req: CreateTranscriptionRequest) -> Result<Transcription> {
        let transcription = Transcription {
            id: Uuid::now_v7(),
            note_id: req.note_id,
            text: req.text,
            language: req.language,
            duration_secs: req.duration_secs,
            model: req.model,
            created_at: Utc::now(),
        };
        self.data
            .lock()
            .unwrap()
            .transcriptions
            .push(transcription.clone());
        Ok(transcription)
    }

    async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<Transcription>> {
        let data = self.data.lock().unwrap();
        let mut rows: Vec<Transcription> = data
            .transcriptions
            .iter()
            .filter(|t| t.note_id == note_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<AuthSession>> {
        Ok(self.data.lock().unwrap().sessions.get(token).cloned())
    }
}

#[async_trait]
impl StatsRepository for InMemoryStore {
    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let data = self.data.lock().unwrap();
        let note_ids: Vec<Uuid> = data
            .notes
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.id)
            .collect();
        let set_ids: Vec<Uuid> = data
            .sets
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id)
            .collect();
        Ok(UserStats {
            notes: note_ids.len() as i64,
            flashcard_sets: set_ids.len() as i64,
            flashcards: data
                .cards
                .iter()
                .filter(|c| set_ids.contains(&c.set_id))
                .count() as i64,
            summaries: data
                .summaries
                .iter()
                .filter(|s| s.user_id == user_id)
                .count() as i64,
            transcriptions: data
                .transcriptions
                .iter()
                .filter(|t| note_ids.contains(&t.note_id))
                .count() as i64,
        })
    }
}

// =============================================================================
// APP CONSTRUCTION
// =============================================================================

pub fn state(store: &Arc<InMemoryStore>) -> AppState {
    AppState::new(Repositories::from_store(store.clone()))
}

pub fn agents(mock: &MockGenerationBackend) -> StudyAgents {
    StudyAgents::new(
        Arc::new(mock.clone()),
        InputGuardrail::new(GuardrailStrategy::Block),
    )
}

pub fn app(state: AppState) -> Router {
    build_router(state, "http://localhost:3000")
}

/// App without generation or transcription backends.
pub fn plain_app(store: &Arc<InMemoryStore>) -> Router {
    app(state(store))
}

pub fn app_with_agents(store: &Arc<InMemoryStore>, mock: &MockGenerationBackend) -> Router {
    app(state(store).with_agents(agents(mock)))
}

pub fn app_with_transcriber(
    store: &Arc<InMemoryStore>,
    transcriber: &MockTranscriptionBackend,
) -> Router {
    app(state(store).with_transcriber(Arc::new(transcriber.clone())))
}

// =============================================================================
// REQUESTS
// =============================================================================

pub fn cookie(token: &str) -> String {
    format!("{}={}.signature", COOKIE_NAME, token)
}

pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie(token))
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::COOKIE, cookie(token))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie(token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

pub fn put_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    json_request("PUT", uri, token, body)
}

pub const BOUNDARY: &str = "learnessence-test-boundary";

/// A multipart part: `(name, optional (file name, content type), bytes)`.
pub type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn post_multipart(uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    let body = multipart_body(parts);
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie(token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

/// Send a request and return the status with the parsed JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
