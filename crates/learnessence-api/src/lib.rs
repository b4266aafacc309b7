//! # learnessence-api
//!
//! HTTP API for LearnEssence: notes, flashcards, summaries and audio
//! transcription behind session authentication.
//!
//! The router is built from an [`AppState`] of trait-object repositories and
//! optional backends, so the same routes run over PostgreSQL in production
//! and over in-memory stores in tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ownership;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use learnessence_core::defaults;
use learnessence_core::{
    FlashcardRepository, NoteRepository, SessionRepository, StatsRepository, SummaryRepository,
    TranscriptionRepository,
};
use learnessence_db::Database;
use learnessence_inference::{StudyAgents, TranscriptionBackend};

pub use auth::AuthUser;
pub use config::ServerConfig;
pub use error::ApiError;
pub use middleware::{build_rate_limiter, parse_allowed_origins, GlobalRateLimiter};

/// Room for multipart boundaries and text fields on top of the file itself.
/// Bodies past the route limit surface as a multipart read error, which the
/// transcribe handler answers with its JSON 413.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Repository handles used by the handlers.
#[derive(Clone)]
pub struct Repositories {
    pub notes: Arc<dyn NoteRepository>,
    pub flashcards: Arc<dyn FlashcardRepository>,
    pub summaries: Arc<dyn SummaryRepository>,
    pub transcriptions: Arc<dyn TranscriptionRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl Repositories {
    /// Use one store for every repository.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: NoteRepository
            + FlashcardRepository
            + SummaryRepository
            + TranscriptionRepository
            + SessionRepository
            + StatsRepository
            + 'static,
    {
        Self {
            notes: store.clone(),
            flashcards: store.clone(),
            summaries: store.clone(),
            transcriptions: store.clone(),
            sessions: store.clone(),
            stats: store,
        }
    }
}

impl From<Database> for Repositories {
    fn from(db: Database) -> Self {
        Self {
            notes: Arc::new(db.notes),
            flashcards: Arc::new(db.flashcards),
            summaries: Arc::new(db.summaries),
            transcriptions: Arc::new(db.transcriptions),
            sessions: Arc::new(db.sessions),
            stats: Arc::new(db.stats),
        }
    }
}

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteRepository>,
    pub flashcards: Arc<dyn FlashcardRepository>,
    pub summaries: Arc<dyn SummaryRepository>,
    pub transcriptions: Arc<dyn TranscriptionRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub stats: Arc<dyn StatsRepository>,
    /// `None` when no generation backend is configured.
    pub agents: Option<StudyAgents>,
    /// `None` when no transcription backend is configured.
    pub transcriber: Option<Arc<dyn TranscriptionBackend>>,
    pub session_cookie_name: String,
    pub max_upload_bytes: usize,
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(repos: Repositories) -> Self {
        Self {
            notes: repos.notes,
            flashcards: repos.flashcards,
            summaries: repos.summaries,
            transcriptions: repos.transcriptions,
            sessions: repos.sessions,
            stats: repos.stats,
            agents: None,
            transcriber: None,
            session_cookie_name: defaults::SESSION_COOKIE_NAME.to_string(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            rate_limiter: None,
        }
    }

    pub fn with_agents(mut self, agents: StudyAgents) -> Self {
        self.agents = Some(agents);
        self
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn TranscriptionBackend>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }
}

/// Build the application router with its middleware stack.
pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let upload_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        .route(
            "/api/notes",
            get(handlers::notes::list_notes).post(handlers::notes::create_note),
        )
        .route("/api/notes/generate", post(handlers::notes::generate_note))
        .route(
            "/api/notes/:id",
            get(handlers::notes::get_note)
                .put(handlers::notes::update_note)
                .delete(handlers::notes::delete_note),
        )
        .route(
            "/api/notes/:id/transcriptions",
            get(handlers::notes::list_note_transcriptions),
        )
        .route(
            "/api/flashcards",
            get(handlers::flashcards::list_flashcard_sets)
                .post(handlers::flashcards::create_flashcard_set),
        )
        .route(
            "/api/flashcards/:id",
            get(handlers::flashcards::get_flashcard_set)
                .delete(handlers::flashcards::delete_flashcard_set),
        )
        .route(
            "/api/summaries",
            get(handlers::summaries::list_summaries).post(handlers::summaries::create_summary),
        )
        .route("/api/stats", get(handlers::stats::get_stats))
        .route(
            "/api/transcribe",
            post(handlers::transcribe::transcribe_audio)
                .layer(DefaultBodyLimit::max(upload_limit)),
        );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(api)
        .layer(DefaultBodyLimit::max(defaults::JSON_BODY_LIMIT_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parse_allowed_origins(allowed_origins)))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        .with_state(state)
}
