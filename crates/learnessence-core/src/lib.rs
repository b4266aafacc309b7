//! # learnessence-core
//!
//! Core types, traits, and text utilities for LearnEssence.
//!
//! This crate holds the domain models, the repository and generation traits,
//! and the pure logic (JSON recovery, input guardrail, naive heuristics) that
//! the database, inference, and API crates build on.

pub mod defaults;
pub mod error;
pub mod guardrail;
pub mod json_recovery;
pub mod logging;
pub mod models;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use guardrail::{
    classify_agent_failure, AgentFailureKind, GuardrailStrategy, InputGuardrail, Verdict,
};
pub use json_recovery::{extract_json, is_parse_failure, parse_llm_json, ParseStrategy};
pub use models::*;
pub use traits::*;
