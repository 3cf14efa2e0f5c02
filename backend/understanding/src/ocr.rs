//! Optical Character Recognition (OCR)
//!
//! Runs the Tesseract CLI as a child process. The image goes in as PNG on
//! stdin and the recognized text comes back on stdout, so nothing touches
//! the filesystem.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use iris_core::{ImageInput, OcrCapability};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

pub struct TesseractOcr {
    binary: String,
    language: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: "eng".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[async_trait]
impl OcrCapability for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &ImageInput) -> Result<String> {
        info!(
            "Running OCR on {}x{} image with {}",
            image.width(),
            image.height(),
            self.binary
        );
        let pixels = image.clone();
        let png = tokio::task::spawn_blocking(move || pixels.to_png())
            .await
            .context("PNG encoder task failed")?
            .context("Failed to encode image as PNG")?;

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start OCR binary '{}'", self.binary))?;

        let mut stdin = child.stdin.take().context("OCR process has no stdin")?;
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&png).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for OCR process")?;

        // The recognizer may exit without draining stdin; its exit status decides.
        if let Ok(Err(e)) = writer.await {
            debug!(error = %e, "OCR process closed stdin early");
        }

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn blank() -> ImageInput {
        ImageInput::from_rgb(RgbImage::from_pixel(16, 16, Rgb([255, 255, 255])))
    }

    #[tokio::test]
    async fn captures_stdout_of_recognizer() {
        // `echo` prints its arguments, which stands in for recognized text.
        let ocr = TesseractOcr::new("echo").with_language("deu");
        let text = ocr.recognize(&blank()).await.unwrap();
        assert_eq!(text.trim(), "stdin stdout -l deu");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn encodes_large_image_on_single_threaded_runtime() {
        let large = ImageInput::from_rgb(RgbImage::from_pixel(1600, 1200, Rgb([90, 90, 90])));
        let text = TesseractOcr::new("echo").recognize(&large).await.unwrap();
        assert_eq!(text.trim(), "stdin stdout -l eng");
    }

    #[tokio::test]
    async fn empty_output_is_not_an_error() {
        let ocr = TesseractOcr::new("true");
        assert_eq!(ocr.recognize(&blank()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn nonzero_exit_is_an_error() {
        let ocr = TesseractOcr::new("false");
        let err = ocr.recognize(&blank()).await.unwrap_err();
        assert!(err.to_string().contains("false exited with"));
    }

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let ocr = TesseractOcr::new("/nonexistent/iris-ocr-binary");
        let err = ocr.recognize(&blank()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to start OCR binary"));
    }
}
