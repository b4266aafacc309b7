//! Structured logging field names shared by every LearnEssence crate.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed on our side (database, misconfiguration) |
//! | WARN  | Upstream failure or guardrail trip, request answered with 4xx/5xx |
//! | INFO  | Lifecycle events (startup, shutdown), records created or deleted |
//! | DEBUG | Decision points: fallback generation, parse strategy used |
//! | TRACE | Raw model output |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "guardrail"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "notes_agent", "whisper", "pool", "auth"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "generate", "transcribe", "create_set"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Authenticated user id.
pub const USER_ID: &str = "user_id";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Flashcard set UUID being operated on.
pub const SET_ID: &str = "set_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned or created.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Size of an uploaded audio file in bytes.
pub const AUDIO_BYTES: &str = "audio_bytes";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for generation or transcription.
pub const MODEL: &str = "model";

/// Which JSON recovery step produced the parsed value.
pub const PARSE_STRATEGY: &str = "parse_strategy";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
