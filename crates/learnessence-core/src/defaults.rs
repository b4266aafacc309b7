//! Centralized default constants and environment variable names.
//!
//! Every crate reads its defaults from here instead of defining its own
//! magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list endpoints.
pub const PAGE_LIMIT: i64 = 10;

/// Largest page size a client may request.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// GENERATION
// =============================================================================

/// Minimum transcript length (characters) accepted by note generation.
pub const MIN_TRANSCRIPT_CHARS: usize = 200;

/// Maximum number of flashcards kept in one set, generated or heuristic.
pub const MAX_FLASHCARDS_PER_SET: usize = 50;

/// Flashcard fronts longer than this are truncated.
pub const FLASHCARD_FRONT_MAX_CHARS: usize = 120;

/// Characters kept before the ellipsis when a front is truncated.
pub const FLASHCARD_FRONT_KEEP_CHARS: usize = 117;

/// Number of leading sentences kept by the summary heuristic.
pub const NAIVE_SUMMARY_SENTENCES: usize = 3;

/// Character budget of the summary heuristic when the text has few sentences.
pub const NAIVE_SUMMARY_CHARS: usize = 400;

/// Characters of source text used as the title of an auto-created note.
pub const AUTO_TITLE_CHARS: usize = 60;

/// Title used when nothing better is available.
pub const UNTITLED_NOTE: &str = "Untitled note";

// =============================================================================
// GUARDRAIL
// =============================================================================

/// Texts shorter than this are never considered educational.
pub const GUARDRAIL_MIN_CHARS: usize = 100;

/// Length at which a single educational keyword is enough.
pub const GUARDRAIL_SUBSTANTIAL_CHARS: usize = 200;

/// Keyword matches that mark a text as educational regardless of length.
pub const GUARDRAIL_KEYWORD_THRESHOLD: usize = 3;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default database URL for local development.
pub const DATABASE_URL: &str = "postgres://localhost/learnessence";

/// Pool size when `DATABASE_MAX_CONNECTIONS` is unset.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Seconds a request waits for a free pooled connection.
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Seconds before an idle pooled connection is closed.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

/// Seconds before a pooled connection is recycled.
pub const DB_MAX_LIFETIME_SECS: u64 = 1800;

/// Default session cookie name.
pub const SESSION_COOKIE_NAME: &str = "learnessence.session_token";

/// Default allowed CORS origins.
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Maximum accepted audio upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Body limit for JSON endpoints.
pub const JSON_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible API base URL (includes the `/v1` prefix).
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default generation model.
pub const GEN_MODEL: &str = "gpt-4o-mini";

/// Default request timeout for generation, in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Default Whisper-compatible base URL (without the `/v1` prefix).
pub const WHISPER_BASE_URL: &str = "https://api.openai.com";

/// Default Whisper model.
pub const WHISPER_MODEL: &str = "whisper-1";

/// Default request timeout for transcription, in seconds.
pub const WHISPER_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_SESSION_COOKIE_NAME: &str = "SESSION_COOKIE_NAME";
pub const ENV_RATE_LIMIT_ENABLED: &str = "RATE_LIMIT_ENABLED";
pub const ENV_RATE_LIMIT_REQUESTS: &str = "RATE_LIMIT_REQUESTS";
pub const ENV_RATE_LIMIT_PERIOD_SECS: &str = "RATE_LIMIT_PERIOD_SECS";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
pub const ENV_GUARDRAIL_STRATEGY: &str = "GUARDRAIL_STRATEGY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_GEN_MODEL: &str = "OPENAI_GEN_MODEL";
pub const ENV_OPENAI_TIMEOUT: &str = "OPENAI_TIMEOUT";
pub const ENV_WHISPER_BASE_URL: &str = "WHISPER_BASE_URL";
pub const ENV_WHISPER_MODEL: &str = "WHISPER_MODEL";
pub const ENV_WHISPER_API_KEY: &str = "WHISPER_API_KEY";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_truncation_leaves_room_for_ellipsis() {
        assert_eq!(FLASHCARD_FRONT_KEEP_CHARS + 3, FLASHCARD_FRONT_MAX_CHARS);
    }

    #[test]
    fn test_page_limits_ordered() {
        assert!(PAGE_LIMIT > 0);
        assert!(PAGE_LIMIT <= PAGE_LIMIT_MAX);
    }

    #[test]
    fn test_upload_limit_is_ten_mebibytes() {
        assert_eq!(MAX_UPLOAD_BYTES, 10_485_760);
    }
}
