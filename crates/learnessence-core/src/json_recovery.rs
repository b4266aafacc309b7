//! Recovery of JSON objects from LLM responses.
//!
//! Models asked for "JSON only" still wrap answers in markdown fences or add
//! a sentence of prose. Recovery tries, in order:
//!
//! 1. the whole response,
//! 2. the body of the first fenced code block (```` ``` ```` or ```` ```json ````),
//! 3. the slice from the first `{` to the last `}`.
//!
//! There is no partial recovery: if all three fail the response is rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Message carried by the error returned when no strategy succeeds.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse agent JSON response";

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex"));

/// Which recovery step produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Direct,
    Fenced,
    BraceSlice,
}

impl ParseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStrategy::Direct => "direct",
            ParseStrategy::Fenced => "fenced",
            ParseStrategy::BraceSlice => "brace_slice",
        }
    }
}

/// Extract a JSON value from raw model output.
pub fn extract_json(raw: &str) -> Result<(Value, ParseStrategy)> {
    trace!(subsystem = "inference", component = "json_recovery", raw = %raw, "Recovering JSON");

    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        return Ok((v, ParseStrategy::Direct));
    }

    if let Some(body) = FENCE.captures(raw).and_then(|c| c.get(1)) {
        if let Ok(v) = serde_json::from_str::<Value>(body.as_str()) {
            return Ok((v, ParseStrategy::Fenced));
        }
    }

    if let (Some(first), Some(last)) = (raw.find('{'), raw.rfind('}')) {
        if last > first {
            if let Ok(v) = serde_json::from_str::<Value>(&raw[first..=last]) {
                return Ok((v, ParseStrategy::BraceSlice));
            }
        }
    }

    Err(Error::Serialization(PARSE_FAILURE_MESSAGE.to_string()))
}

/// Extract and deserialize a typed value from raw model output.
///
/// A recovered value that does not match `T` is reported the same way as an
/// unparsable response.
pub fn parse_llm_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let (value, strategy) = extract_json(raw)?;
    debug!(
        subsystem = "inference",
        component = "json_recovery",
        parse_strategy = strategy.as_str(),
        "Recovered JSON from model output"
    );
    serde_json::from_value(value)
        .map_err(|e| Error::Serialization(format!("{}: {}", PARSE_FAILURE_MESSAGE, e)))
}

/// True if the error came from JSON recovery.
pub fn is_parse_failure(err: &Error) -> bool {
    matches!(err, Error::Serialization(msg) if msg.starts_with(PARSE_FAILURE_MESSAGE))
}
