//! # learnessence-inference
//!
//! Generation and transcription backends for LearnEssence.
//!
//! - [`openai`]: OpenAI-compatible chat completions backend
//! - [`transcription`]: Whisper-compatible audio transcription
//! - [`agents`]: notes, flashcards and summary agents with the input
//!   guardrail and JSON recovery wired in

pub mod agents;
pub mod openai;
pub mod transcription;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use learnessence_core::*;

pub use agents::{
    AgentOutcome, FlashcardsAgent, GeneratedCard, GeneratedFlashcards, GeneratedNote,
    GeneratedSummary, NotesAgent, StudyAgents, SummaryAgent,
};
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use transcription::{
    AudioUpload, TranscriptionBackend, TranscriptionResult, TranscriptionSegment, WhisperBackend,
    WhisperConfig,
};
