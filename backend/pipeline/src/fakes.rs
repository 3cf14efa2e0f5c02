//! Scripted capabilities for pipeline tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use image::{Rgb, RgbImage};
use iris_core::{ImageInput, OcrCapability, SpeechCapability, VisionCapability, VisionRequest};

pub fn white_image() -> ImageInput {
    ImageInput::from_rgb(RgbImage::from_pixel(32, 32, Rgb([255, 255, 255])))
}

/// Replies with a fixed result, optionally after a delay.
pub struct Scripted {
    reply: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn ok(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::ok("")
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inputs received, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    async fn answer(&self, input: String) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(input);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

#[async_trait]
impl VisionCapability for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn describe(&self, request: &VisionRequest) -> Result<String> {
        self.answer(request.image().data().to_string()).await
    }
}

#[async_trait]
impl OcrCapability for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn recognize(&self, image: &ImageInput) -> Result<String> {
        self.answer(format!("{}x{}", image.width(), image.height())).await
    }
}

#[async_trait]
impl SpeechCapability for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn speak(&self, text: &str, language: &str) -> Result<Bytes> {
        assert_eq!(language, iris_core::SPEECH_LANGUAGE);
        self.answer(text.to_string()).await.map(Bytes::from)
    }
}
