//! Domain models for notes, flashcards, summaries, transcriptions and users.
//!
//! JSON field names are camelCase to match the web client's contract.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// ENUMS
// =============================================================================

/// How a note's content entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteSourceType {
    Voice,
    #[default]
    Text,
    Imported,
}

impl NoteSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteSourceType::Voice => "VOICE",
            NoteSourceType::Text => "TEXT",
            NoteSourceType::Imported => "IMPORTED",
        }
    }
}

impl fmt::Display for NoteSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteSourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "VOICE" => Ok(NoteSourceType::Voice),
            "TEXT" => Ok(NoteSourceType::Text),
            "IMPORTED" => Ok(NoteSourceType::Imported),
            _ => Err(Error::InvalidInput(format!("Unknown source type: {}", s))),
        }
    }
}

/// Presentation style of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryStyle {
    /// One or two sentence gist.
    Flash,
    /// Key points as a short list.
    Keys,
    #[default]
    Detailed,
    /// Explanatory, as a teacher would present it.
    Teacher,
    /// Exam-revision oriented.
    Exam,
}

impl SummaryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Flash => "FLASH",
            SummaryStyle::Keys => "KEYS",
            SummaryStyle::Detailed => "DETAILED",
            SummaryStyle::Teacher => "TEACHER",
            SummaryStyle::Exam => "EXAM",
        }
    }

    /// Prompt guidance for the summary agent.
    pub fn instruction(&self) -> &'static str {
        match self {
            SummaryStyle::Flash => "Write a one or two sentence gist of the text.",
            SummaryStyle::Keys => {
                "List the key points of the text, one per line, each starting with \"- \"."
            }
            SummaryStyle::Detailed => {
                "Write a detailed summary of the text in a few short paragraphs."
            }
            SummaryStyle::Teacher => {
                "Summarize the text as a teacher explaining it to a student, defining terms as you go."
            }
            SummaryStyle::Exam => {
                "Summarize the text for exam revision: definitions, facts, and likely questions."
            }
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "FLASH" => Ok(SummaryStyle::Flash),
            "KEYS" => Ok(SummaryStyle::Keys),
            "DETAILED" => Ok(SummaryStyle::Detailed),
            "TEACHER" => Ok(SummaryStyle::Teacher),
            "EXAM" => Ok(SummaryStyle::Exam),
            _ => Err(Error::InvalidInput(format!("Unknown summary style: {}", s))),
        }
    }
}

// =============================================================================
// USERS & SESSIONS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A verified session, as resolved from a session token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// =============================================================================
// NOTES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub source_type: NoteSourceType,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub source_type: NoteSourceType,
}

/// Partial note update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

// =============================================================================
// FLASHCARDS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub note_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub set_id: Uuid,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
}

/// Card content before it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewFlashcard {
    pub front: String,
    pub back: String,
}

/// Request for creating a flashcard set together with its cards.
#[derive(Debug, Clone)]
pub struct CreateFlashcardSetRequest {
    pub user_id: Uuid,
    pub title: String,
    pub note_id: Option<Uuid>,
    pub cards: Vec<NewFlashcard>,
}

/// List row: a set plus the number of cards it holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSetSummary {
    #[serde(flatten)]
    pub set: FlashcardSet,
    pub card_count: i64,
}

/// A set with all of its cards, oldest card first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSetWithCards {
    #[serde(flatten)]
    pub set: FlashcardSet,
    pub cards: Vec<Flashcard>,
}

// =============================================================================
// SUMMARIES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: Uuid,
    pub content: String,
    pub style: SummaryStyle,
    pub note_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSummaryRequest {
    pub user_id: Uuid,
    pub note_id: Uuid,
    pub content: String,
    pub style: SummaryStyle,
}

/// Minimal note reference embedded in list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryWithNote {
    #[serde(flatten)]
    pub summary: Summary,
    pub note: NoteRef,
}

// =============================================================================
// TRANSCRIPTIONS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub id: Uuid,
    pub note_id: Uuid,
    pub text: String,
    pub language: Option<String>,
    pub duration_secs: Option<f64>,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTranscriptionRequest {
    pub note_id: Uuid,
    pub text: String,
    pub language: Option<String>,
    pub duration_secs: Option<f64>,
    pub model: String,
}

// =============================================================================
// STATS & PAGINATION
// =============================================================================

/// Per-user entity counts for the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub notes: i64,
    pub flashcard_sets: i64,
    pub flashcards: i64,
    pub summaries: i64,
    pub transcriptions: i64,
}

/// Validated limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: defaults::PAGE_LIMIT,
            offset: defaults::PAGE_OFFSET,
        }
    }
}

impl Page {
    /// Build a page from optional query values, applying defaults.
    ///
    /// `limit` must be within `1..=PAGE_LIMIT_MAX` and `offset` must not be
    /// negative.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self> {
        let limit = limit.unwrap_or(defaults::PAGE_LIMIT);
        let offset = offset.unwrap_or(defaults::PAGE_OFFSET);

        if !(1..=defaults::PAGE_LIMIT_MAX).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and {}",
                defaults::PAGE_LIMIT_MAX
            )));
        }
        if offset < 0 {
            return Err(Error::InvalidInput("offset must be >= 0".to_string()));
        }
        Ok(Self { limit, offset })
    }
}
