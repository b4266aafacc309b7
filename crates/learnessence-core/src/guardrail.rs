//! Input guardrail run before any text reaches a generation backend.
//!
//! The check is heuristic: greetings and small talk are rejected, and the
//! text must be long enough and mention enough study vocabulary to look like
//! learning material.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::defaults;
use crate::error::Error;

/// Reason reported when the input is empty.
pub const EMPTY_INPUT_REASON: &str = "No text content found in messages";

/// Reason reported when the input is not study material.
pub const NOT_EDUCATIONAL_REASON: &str = "Content does not appear to be educational. Please provide learning materials, lecture notes, study content, or educational text.";

static GREETINGS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(hi|hello|hey|greetings?|good (morning|afternoon|evening)|what'?s up)[\s!.?]*$",
        r"(?i)^(how are you|how'?s it going|sup|yo)[\s!.?]*$",
        r"(?i)^(thanks?|thank you|bye|goodbye|see you|later)[\s!.?]*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid greeting regex"))
    .collect()
});

static SENTENCE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence split regex"));

const EDUCATIONAL_KEYWORDS: &[&str] = &[
    // Academic terms
    "study", "learn", "course", "lecture", "lesson", "chapter", "topic", "subject", "concept",
    "theory", "definition", "explain", "understand", "analysis", "research", "experiment",
    "hypothesis", "conclusion", "evidence", "argument",
    // Content types
    "notes", "summary", "overview", "introduction", "background", "history", "development",
    "process", "method", "technique", "principle", "formula", "equation", "theorem", "law",
    "rule",
    // Subjects
    // "history" is listed twice and counts double.
    "mathematics", "science", "biology", "chemistry", "physics", "history", "geography",
    "literature", "language", "economics", "psychology", "sociology", "philosophy",
    "engineering", "computer", "programming",
    // Verbs
    "describe", "compare", "contrast", "analyze", "evaluate", "summarize", "discuss", "examine",
    "explore", "investigate",
];

/// What to do when the input does not look educational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardrailStrategy {
    /// Abort generation.
    #[default]
    Block,
    /// Log a warning and continue.
    Warn,
}

impl FromStr for GuardrailStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(GuardrailStrategy::Block),
            "warn" => Ok(GuardrailStrategy::Warn),
            other => Err(Error::Config(format!(
                "Unknown guardrail strategy '{}', expected 'block' or 'warn'",
                other
            ))),
        }
    }
}

/// Outcome of a guardrail check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Tripwire: generation must not run.
    Blocked(String),
}

/// Educational-content validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputGuardrail {
    strategy: GuardrailStrategy,
}

impl InputGuardrail {
    pub fn new(strategy: GuardrailStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> GuardrailStrategy {
        self.strategy
    }

    /// Check text before it is sent to a model.
    ///
    /// Empty input is always blocked, whatever the strategy.
    pub fn check(&self, text: &str) -> Verdict {
        let text = text.trim();
        if text.is_empty() {
            return Verdict::Blocked(EMPTY_INPUT_REASON.to_string());
        }

        if is_educational(text) {
            return Verdict::Allow;
        }

        match self.strategy {
            GuardrailStrategy::Block => Verdict::Blocked(NOT_EDUCATIONAL_REASON.to_string()),
            GuardrailStrategy::Warn => {
                warn!(
                    subsystem = "guardrail",
                    component = "educational_content",
                    text_len = text.len(),
                    "Content may not be educational, continuing due to warn strategy"
                );
                Verdict::Allow
            }
        }
    }
}

/// Heuristic educational-content test.
pub fn is_educational(text: &str) -> bool {
    let lower = text.trim().to_lowercase();

    if GREETINGS.iter().any(|re| re.is_match(&lower)) {
        return false;
    }

    let len = text.chars().count();
    if len < defaults::GUARDRAIL_MIN_CHARS {
        return false;
    }

    let keyword_matches = EDUCATIONAL_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();

    if keyword_matches >= defaults::GUARDRAIL_KEYWORD_THRESHOLD {
        return true;
    }
    if keyword_matches >= 1 && len >= defaults::GUARDRAIL_SUBSTANTIAL_CHARS {
        return true;
    }

    let sentences = SENTENCE_SPLIT
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count();
    let has_capitalization = text.chars().any(|c| c.is_ascii_uppercase());

    sentences >= 3 && has_capitalization && keyword_matches >= 1
}

/// Category of a generation failure, judged from its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentFailureKind {
    /// Moderation or a guardrail rejected the content.
    ContentBlocked,
    /// Prompt-injection or jailbreak detection fired.
    InvalidInput,
    Other,
}

/// Classify a generation error message.
pub fn classify_agent_failure(message: &str) -> AgentFailureKind {
    let lower = message.to_lowercase();
    if lower.contains("blocked") || lower.contains("moderation") {
        AgentFailureKind::ContentBlocked
    } else if lower.contains("injection") || lower.contains("jailbreak") {
        AgentFailureKind::InvalidInput
    } else {
        AgentFailureKind::Other
    }
}
