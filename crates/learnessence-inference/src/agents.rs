//! Study agents: LLM-backed generators for notes, flashcards and summaries.
//!
//! Every agent runs the input guardrail before calling the model. A tripped
//! guardrail yields [`AgentOutcome::Blocked`] and the backend is never
//! called. Model output goes through JSON recovery; an unrecoverable reply
//! is returned as the recovery error so callers can tell it apart from a
//! backend failure.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use learnessence_core::defaults::MAX_FLASHCARDS_PER_SET;
use learnessence_core::{
    parse_llm_json, GenerationBackend, InputGuardrail, NewFlashcard, Result, SummaryStyle, Verdict,
};

const NOTES_INSTRUCTIONS: &str = "You are an agent that converts input text (lecture notes, \
transcripts, or freeform speech) into a concise note. Return a JSON object with this exact \
structure: { \"title\": \"A short descriptive title\", \"content\": \"The note content as plain \
text\" }. The content field must be plain text with clear paragraph breaks: use blank lines to \
separate paragraphs or logical sections. Do not include extra JSON fields, metadata, or \
explanatory text. Do not use HTML, markdown headings, or other markup. Preserve sentence \
punctuation and organize the content into short paragraphs. The response must be valid JSON \
matching the specified shape.";

const FLASHCARDS_INSTRUCTIONS: &str = "You are an agent whose sole purpose is to generate \
flashcards from the given text, which may be lecture notes or personal notes. Distill the most \
important information into flashcards. Return a JSON object with this exact structure: \
{ \"title\": \"A descriptive title for the flashcard set\", \"flashCards\": [{ \"question\": \
\"The question text\", \"answer\": \"The answer text\" }] }. Each flashCards entry has only \
\"question\" and \"answer\" fields. Do not include any other fields or explanatory text; return \
only the JSON object.";

const SUMMARY_INSTRUCTIONS: &str = "You are an agent that summarizes study material for a \
student. Return a JSON object with this exact structure: { \"content\": \"The summary as plain \
text\" }. Use plain text with line breaks; no HTML or markdown headings. Do not include any \
other fields or explanatory text.";

/// Result of an agent run.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome<T> {
    Generated(T),
    /// The input guardrail rejected the text; nothing was generated.
    Blocked { reason: String },
}

/// Note produced by [`NotesAgent`]. Both fields may be missing from the
/// model's reply.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeneratedNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneratedCard {
    pub question: String,
    pub answer: String,
}

/// Flashcard set produced by [`FlashcardsAgent`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeneratedFlashcards {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "flashCards", default)]
    pub flash_cards: Vec<GeneratedCard>,
}

impl GeneratedFlashcards {
    /// Cards in storage form: question on the front, answer on the back.
    /// Replies longer than a set allows are cut off.
    pub fn into_cards(self) -> Vec<NewFlashcard> {
        self.flash_cards
            .into_iter()
            .take(MAX_FLASHCARDS_PER_SET)
            .map(|c| NewFlashcard {
                front: c.question,
                back: c.answer,
            })
            .collect()
    }
}

/// Summary produced by [`SummaryAgent`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeneratedSummary {
    #[serde(default)]
    pub content: Option<String>,
}

/// Shared run loop: guardrail, backend call, JSON recovery.
#[derive(Clone)]
struct AgentRunner {
    name: &'static str,
    instructions: &'static str,
    backend: Arc<dyn GenerationBackend>,
    guardrail: InputGuardrail,
}

impl AgentRunner {
    async fn run<T: DeserializeOwned>(&self, input: &str, prompt: &str) -> Result<AgentOutcome<T>> {
        if let Verdict::Blocked(reason) = self.guardrail.check(input) {
            warn!(
                subsystem = "guardrail",
                component = self.name,
                input_len = input.len(),
                reason = %reason,
                "Input blocked before generation"
            );
            return Ok(AgentOutcome::Blocked { reason });
        }

        let start = Instant::now();
        let raw = self
            .backend
            .generate_with_system(self.instructions, prompt)
            .await?;

        debug!(
            subsystem = "inference",
            component = self.name,
            op = "generate",
            model = self.backend.model_name(),
            response_len = raw.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Agent reply received"
        );

        let parsed = parse_llm_json::<T>(&raw)?;
        info!(
            subsystem = "inference",
            component = self.name,
            op = "generate",
            duration_ms = start.elapsed().as_millis() as u64,
            "Agent generation complete"
        );
        Ok(AgentOutcome::Generated(parsed))
    }
}

/// Turns transcripts or rough text into a titled note.
#[derive(Clone)]
pub struct NotesAgent {
    runner: AgentRunner,
}

impl NotesAgent {
    pub fn new(backend: Arc<dyn GenerationBackend>, guardrail: InputGuardrail) -> Self {
        Self {
            runner: AgentRunner {
                name: "notes_agent",
                instructions: NOTES_INSTRUCTIONS,
                backend,
                guardrail,
            },
        }
    }

    pub async fn generate(&self, text: &str) -> Result<AgentOutcome<GeneratedNote>> {
        self.runner
            .run(text, &format!("Create a concise note from the text below:\n\n{}", text))
            .await
    }
}

/// Distills text into question/answer flashcards.
#[derive(Clone)]
pub struct FlashcardsAgent {
    runner: AgentRunner,
}

impl FlashcardsAgent {
    pub fn new(backend: Arc<dyn GenerationBackend>, guardrail: InputGuardrail) -> Self {
        Self {
            runner: AgentRunner {
                name: "flashcards_agent",
                instructions: FLASHCARDS_INSTRUCTIONS,
                backend,
                guardrail,
            },
        }
    }

    pub async fn generate(&self, text: &str) -> Result<AgentOutcome<GeneratedFlashcards>> {
        self.runner
            .run(text, &format!("Generate flashcards from this text:\n\n{}", text))
            .await
    }
}

/// Summarizes text in one of the [`SummaryStyle`]s.
#[derive(Clone)]
pub struct SummaryAgent {
    runner: AgentRunner,
}

impl SummaryAgent {
    pub fn new(backend: Arc<dyn GenerationBackend>, guardrail: InputGuardrail) -> Self {
        Self {
            runner: AgentRunner {
                name: "summary_agent",
                instructions: SUMMARY_INSTRUCTIONS,
                backend,
                guardrail,
            },
        }
    }

    pub async fn generate(
        &self,
        text: &str,
        style: SummaryStyle,
    ) -> Result<AgentOutcome<GeneratedSummary>> {
        let prompt = format!("{}\n\nText:\n{}", style.instruction(), text);
        self.runner.run(text, &prompt).await
    }
}

/// The three agents over one backend and guardrail.
#[derive(Clone)]
pub struct StudyAgents {
    pub notes: NotesAgent,
    pub flashcards: FlashcardsAgent,
    pub summary: SummaryAgent,
}

impl StudyAgents {
    pub fn new(backend: Arc<dyn GenerationBackend>, guardrail: InputGuardrail) -> Self {
        Self {
            notes: NotesAgent::new(backend.clone(), guardrail),
            flashcards: FlashcardsAgent::new(backend.clone(), guardrail),
            summary: SummaryAgent::new(backend, guardrail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;
    use learnessence_core::{is_parse_failure, Error, GuardrailStrategy};

    const LECTURE: &str = "Today's lecture covers cellular respiration. We will study how cells \
        convert glucose into ATP, examine the role of mitochondria, and discuss the difference \
        between aerobic and anaerobic processes in detail.";

    fn agents(mock: &MockGenerationBackend) -> StudyAgents {
        StudyAgents::new(
            Arc::new(mock.clone()),
            InputGuardrail::new(GuardrailStrategy::Block),
        )
    }

    #[tokio::test]
    async fn test_notes_agent_parses_fenced_reply() {
        let mock = MockGenerationBackend::new().with_fixed_response(
            "```json\n{\"title\": \"Cellular respiration\", \"content\": \"Cells make ATP.\"}\n```",
        );
        let outcome = agents(&mock).notes.generate(LECTURE).await.unwrap();
        assert_eq!(
            outcome,
            AgentOutcome::Generated(GeneratedNote {
                title: Some("Cellular respiration".to_string()),
                content: Some("Cells make ATP.".to_string()),
            })
        );

        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("concise note"));
        assert_eq!(
            calls[0].prompt,
            format!("Create a concise note from the text below:\n\n{}", LECTURE)
        );
    }

    #[tokio::test]
    async fn test_guardrail_blocks_without_calling_backend() {
        let mock = MockGenerationBackend::new();
        let outcome = agents(&mock).notes.generate("hello").await.unwrap();
        assert!(matches!(outcome, AgentOutcome::Blocked { .. }));
        assert_eq!(mock.generate_call_count(), 0);
    }

    #[tokio::test]
    async fn test_flashcards_agent_maps_cards() {
        let mock = MockGenerationBackend::new().with_fixed_response(
            r#"{"title": "Respiration", "flashCards": [
                {"question": "Where is ATP made?", "answer": "Mitochondria"},
                {"question": "Input sugar?", "answer": "Glucose"}
            ]}"#,
        );
        let outcome = agents(&mock).flashcards.generate(LECTURE).await.unwrap();
        let AgentOutcome::Generated(generated) = outcome else {
            panic!("expected generated flashcards");
        };
        assert_eq!(generated.title.as_deref(), Some("Respiration"));
        let cards = generated.into_cards();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "Where is ATP made?");
        assert_eq!(cards[0].back, "Mitochondria");
    }

    #[test]
    fn test_into_cards_caps_long_replies() {
        let generated = GeneratedFlashcards {
            title: None,
            flash_cards: (0..MAX_FLASHCARDS_PER_SET + 25)
                .map(|i| GeneratedCard {
                    question: format!("Q{}", i),
                    answer: format!("A{}", i),
                })
                .collect(),
        };
        let cards = generated.into_cards();
        assert_eq!(cards.len(), MAX_FLASHCARDS_PER_SET);
        assert_eq!(cards[0].front, "Q0");
        assert_eq!(cards[MAX_FLASHCARDS_PER_SET - 1].back, format!("A{}", MAX_FLASHCARDS_PER_SET - 1));
    }

    #[tokio::test]
    async fn test_summary_prompt_carries_style() {
        let mock =
            MockGenerationBackend::new().with_fixed_response(r#"{"content": "ATP from glucose."}"#);
        let outcome = agents(&mock)
            .summary
            .generate(LECTURE, SummaryStyle::Exam)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AgentOutcome::Generated(GeneratedSummary {
                content: Some("ATP from glucose.".to_string())
            })
        );
        let calls = mock.get_calls();
        assert!(calls[0].prompt.starts_with(SummaryStyle::Exam.instruction()));
        assert!(calls[0].prompt.ends_with(LECTURE));
    }

    #[tokio::test]
    async fn test_unparsable_reply_is_parse_failure() {
        let mock = MockGenerationBackend::new().with_fixed_response("I'd rather not.");
        let err = agents(&mock).notes.generate(LECTURE).await.unwrap_err();
        assert!(is_parse_failure(&err));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let mock = MockGenerationBackend::new().with_failure("Request blocked by moderation");
        let err = agents(&mock).notes.generate(LECTURE).await.unwrap_err();
        assert!(matches!(err, Error::Inference(ref m) if m.contains("moderation")));
    }

    #[tokio::test]
    async fn test_warn_strategy_lets_chatter_through() {
        let mock =
            MockGenerationBackend::new().with_fixed_response(r#"{"title": "Hi", "content": ""}"#);
        let agents = StudyAgents::new(
            Arc::new(mock.clone()),
            InputGuardrail::new(GuardrailStrategy::Warn),
        );
        let outcome = agents.notes.generate("hello there").await.unwrap();
        assert!(matches!(outcome, AgentOutcome::Generated(_)));
        assert_eq!(mock.generate_call_count(), 1);
    }
}
