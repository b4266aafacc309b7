//! Audio-to-text transcription through a Whisper-compatible API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use learnessence_core::{defaults, Error, Result};

/// A segment of transcribed audio with timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Result of audio transcription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionResult {
    /// Full transcribed text.
    pub text: String,
    /// Detected language as reported by the service.
    pub language: Option<String>,
    /// Total audio duration in seconds.
    pub duration: Option<f64>,
    pub segments: Vec<TranscriptionSegment>,
}

/// An uploaded audio file.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// Backend for transcribing audio files.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe audio data. Upstream failures are `Error::Transcription`
    /// carrying the service's response body.
    async fn transcribe(
        &self,
        audio: AudioUpload,
        language: Option<&str>,
    ) -> Result<TranscriptionResult>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Configuration for [`WhisperBackend`].
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Base URL without the `/v1` prefix.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::WHISPER_BASE_URL.to_string(),
            api_key: None,
            model: defaults::WHISPER_MODEL.to_string(),
            timeout_seconds: defaults::WHISPER_TIMEOUT_SECS,
        }
    }
}

impl WhisperConfig {
    /// Read configuration from environment variables.
    ///
    /// The key comes from `WHISPER_API_KEY`, falling back to
    /// `OPENAI_API_KEY`. Returns `None` when there is neither a key nor a
    /// `WHISPER_BASE_URL`.
    pub fn from_env() -> Option<Self> {
        let api_key = non_empty_env(defaults::ENV_WHISPER_API_KEY)
            .or_else(|| non_empty_env(defaults::ENV_OPENAI_API_KEY));
        let base_url = non_empty_env(defaults::ENV_WHISPER_BASE_URL);
        if api_key.is_none() && base_url.is_none() {
            return None;
        }

        Some(Self {
            base_url: base_url.unwrap_or_else(|| defaults::WHISPER_BASE_URL.to_string()),
            api_key,
            model: non_empty_env(defaults::ENV_WHISPER_MODEL)
                .unwrap_or_else(|| defaults::WHISPER_MODEL.to_string()),
            timeout_seconds: defaults::WHISPER_TIMEOUT_SECS,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// OpenAI Whisper backend (also works with Speaches/faster-whisper-server).
pub struct WhisperBackend {
    client: reqwest::Client,
    config: WhisperConfig,
}

impl WhisperBackend {
    pub fn new(config: WhisperConfig) -> Self {
        info!(
            subsystem = "inference",
            component = "whisper",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing Whisper backend"
        );
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create from environment variables, if transcription is configured.
    pub fn from_env() -> Option<Self> {
        WhisperConfig::from_env().map(Self::new)
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

/// Verbose JSON response of the transcription endpoint.
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    segments: Option<Vec<WhisperSegment>>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Fallback upload name derived from the MIME type.
fn file_name_for(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/mpeg" | "audio/mp3" => "recording.mp3",
        "audio/wav" | "audio/x-wav" => "recording.wav",
        "audio/ogg" => "recording.ogg",
        "audio/flac" => "recording.flac",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "recording.m4a",
        _ => "recording.webm",
    }
}

#[async_trait]
impl TranscriptionBackend for WhisperBackend {
    async fn transcribe(
        &self,
        audio: AudioUpload,
        language: Option<&str>,
    ) -> Result<TranscriptionResult> {
        let start = Instant::now();
        let url = format!(
            "{}/v1/audio/transcriptions",
            self.config.base_url.trim_end_matches('/')
        );
        let audio_bytes = audio.data.len();

        let file_name = if audio.file_name.is_empty() {
            file_name_for(&audio.mime_type).to_string()
        } else {
            audio.file_name
        };

        let file_part = reqwest::multipart::Part::bytes(audio.data)
            .file_name(file_name)
            .mime_str(&audio.mime_type)
            .map_err(|e| Error::InvalidInput(format!("Invalid audio MIME type: {}", e)))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json");

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let mut request = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(Duration::from_secs(self.config.timeout_seconds));
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        debug!(
            subsystem = "inference",
            component = "whisper",
            op = "transcribe",
            audio_bytes,
            model = %self.config.model,
            "Sending audio for transcription"
        );

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Transcription request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                subsystem = "inference",
                component = "whisper",
                op = "transcribe",
                status = status.as_u16(),
                "Transcription service returned an error"
            );
            return Err(Error::Transcription(body));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            Error::Transcription(format!("Failed to parse transcription response: {}", e))
        })?;

        let segments = result
            .segments
            .unwrap_or_default()
            .into_iter()
            .map(|s| TranscriptionSegment {
                start: s.start,
                end: s.end,
                text: s.text,
            })
            .collect();

        info!(
            subsystem = "inference",
            component = "whisper",
            op = "transcribe",
            audio_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "Transcription complete"
        );

        Ok(TranscriptionResult {
            text: result.text,
            language: result.language,
            duration: result.duration,
            segments,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
