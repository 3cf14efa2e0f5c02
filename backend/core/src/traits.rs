use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::types::{ImageInput, VisionRequest};

/// A multimodal model that turns an image plus instructions into text.
#[async_trait]
pub trait VisionCapability: Send + Sync {
    /// Provider name (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send the request and return the model's text verbatim.
    async fn describe(&self, request: &VisionRequest) -> Result<String>;
}

/// An optical character recognizer.
#[async_trait]
pub trait OcrCapability: Send + Sync {
    fn name(&self) -> &str;

    /// Return all recognized text, possibly empty.
    async fn recognize(&self, image: &ImageInput) -> Result<String>;
}

/// A text-to-speech engine producing compressed audio.
#[async_trait]
pub trait SpeechCapability: Send + Sync {
    fn name(&self) -> &str;

    /// MIME type of the audio returned by [`SpeechCapability::speak`].
    fn mime_type(&self) -> &'static str {
        "audio/mpeg"
    }

    async fn speak(&self, text: &str, language: &str) -> Result<Bytes>;
}
