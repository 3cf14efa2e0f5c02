/// TTS provider trait and implementations (Google Translate + OpenAI TTS).
///
/// Every provider returns MP3, matching the `audio/mpeg` default of
/// [`SpeechCapability::mime_type`].
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use iris_core::SpeechCapability;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::gtts::GoogleTranslateTts;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A TTS request.
#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    /// ISO 639-1 language code, e.g. "en".
    pub language: String,
}

impl Default for TtsRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            language: iris_core::SPEECH_LANGUAGE.to_string(),
        }
    }
}

/// Returns MP3 audio bytes.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes>;
}

/// Adapts any [`TtsProvider`] to the speech capability used by the pipelines.
pub struct SpeechEngine {
    provider: Box<dyn TtsProvider>,
}

impl SpeechEngine {
    pub fn new(provider: Box<dyn TtsProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SpeechCapability for SpeechEngine {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn speak(&self, text: &str, language: &str) -> Result<Bytes> {
        let req = TtsRequest {
            text: text.to_string(),
            language: language.to_string(),
        };
        self.provider.synthesize(req).await
    }
}

// ---------------------------------------------------------------------------
// OpenAI TTS
// ---------------------------------------------------------------------------

pub struct OpenAiTts {
    api_key: String,
    model: String,
    voice: String,
    base_url: String,
    client: Client,
}

impl OpenAiTts {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "tts-1".to_string(),
            voice: "nova".to_string(),
            base_url: "https://api.openai.com".to_string(),
            client: Client::new(),
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct OpenAiTtsBody {
    model: String,
    input: String,
    voice: String,
    response_format: &'static str,
}

#[async_trait]
impl TtsProvider for OpenAiTts {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes> {
        // The model detects language from the input text.
        let body = OpenAiTtsBody {
            model: self.model.clone(),
            input: req.text,
            voice: self.voice.clone(),
            response_format: "mp3",
        };
        info!("[TTS/OpenAI] Synthesizing with model={}", body.model);
        let bytes = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI TTS request failed")?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub enum TtsProviderKind {
    GoogleTranslate { base_url: Option<String> },
    OpenAi { api_key: String, voice: Option<String>, base_url: Option<String> },
}

pub fn create_tts(kind: TtsProviderKind) -> Box<dyn TtsProvider> {
    match kind {
        TtsProviderKind::GoogleTranslate { base_url } => {
            let mut tts = GoogleTranslateTts::new();
            if let Some(url) = base_url {
                tts = tts.with_base_url(url);
            }
            Box::new(tts)
        }
        TtsProviderKind::OpenAi { api_key, voice, base_url } => {
            let mut tts = OpenAiTts::new(api_key);
            if let Some(voice) = voice {
                tts = tts.with_voice(voice);
            }
            if let Some(url) = base_url {
                tts = tts.with_base_url(url);
            }
            Box::new(tts)
        }
    }
}
