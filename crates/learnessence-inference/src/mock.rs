//! Mock backends for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use learnessence_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_fixed_response(r#"{"title": "T", "content": "C"}"#);
//! let reply = backend.generate("anything").await?;
//! assert_eq!(backend.generate_call_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use learnessence_core::{Error, GenerationBackend, Result};

use crate::transcription::{
    AudioUpload, TranscriptionBackend, TranscriptionResult, TranscriptionSegment,
};

/// A recorded generation call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
struct MockConfig {
    fixed_responses: HashMap<String, String>,
    default_response: String,
    failure: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fixed_responses: HashMap::new(),
            default_response: r#"{"title": "Mock title", "content": "Mock content"}"#.to_string(),
            failure: None,
        }
    }
}

/// Mock generation backend.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` to every prompt without a mapping.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Reply with `output` when the prompt equals `input`.
    pub fn with_response_mapping(
        mut self,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .insert(input.into(), output.into());
        self
    }

    /// Fail every call with `Error::Inference(message)`.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn generate_call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(MockCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        if let Some(ref message) = self.config.failure {
            return Err(Error::Inference(message.clone()));
        }

        Ok(self
            .config
            .fixed_responses
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| self.config.default_response.clone()))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock transcription backend.
#[derive(Clone)]
pub struct MockTranscriptionBackend {
    result: Arc<std::result::Result<TranscriptionResult, String>>,
    uploads: Arc<Mutex<Vec<(AudioUpload, Option<String>)>>>,
}

impl MockTranscriptionBackend {
    /// Transcribes every upload to `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            result: Arc::new(Ok(TranscriptionResult {
                text: text.clone(),
                language: Some("english".to_string()),
                duration: Some(1.5),
                segments: vec![TranscriptionSegment {
                    start: 0.0,
                    end: 1.5,
                    text,
                }],
            })),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every upload with `Error::Transcription(details)`.
    pub fn failing(details: impl Into<String>) -> Self {
        Self {
            result: Arc::new(Err(details.into())),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Uploads received so far with their requested language.
    pub fn uploads(&self) -> Vec<(AudioUpload, Option<String>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionBackend for MockTranscriptionBackend {
    async fn transcribe(
        &self,
        audio: AudioUpload,
        language: Option<&str>,
    ) -> Result<TranscriptionResult> {
        self.uploads
            .lock()
            .unwrap()
            .push((audio, language.map(String::from)));

        match self.result.as_ref() {
            Ok(result) => Ok(result.clone()),
            Err(details) => Err(Error::Transcription(details.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mapping_overrides_default() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response("default")
            .with_response_mapping("special", "mapped");
        assert_eq!(backend.generate("special").await.unwrap(), "mapped");
        assert_eq!(backend.generate("other").await.unwrap(), "default");
        assert_eq!(backend.generate_call_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_logged_and_returned() {
        let backend = MockGenerationBackend::new().with_failure("boom");
        assert!(backend.generate("x").await.is_err());
        assert_eq!(backend.get_calls()[0].prompt, "x");
    }

    #[tokio::test]
    async fn test_mock_transcription_records_uploads() {
        let backend = MockTranscriptionBackend::new("hello");
        let upload = AudioUpload {
            data: vec![1, 2, 3],
            file_name: "a.webm".to_string(),
            mime_type: "audio/webm".to_string(),
        };
        let result = backend.transcribe(upload, Some("en")).await.unwrap();
        assert_eq!(result.text, "hello");
        assert_eq!(backend.uploads()[0].1.as_deref(), Some("en"));

        let failing = MockTranscriptionBackend::failing("bad audio");
        let upload = AudioUpload {
            data: vec![],
            file_name: String::new(),
            mime_type: "audio/webm".to_string(),
        };
        assert!(matches!(
            failing.transcribe(upload, None).await,
            Err(Error::Transcription(_))
        ));
    }
}
