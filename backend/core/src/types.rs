use std::fmt;
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use image::{DynamicImage, ImageError, ImageFormat, RgbImage};
use uuid::Uuid;

/// Instruction sent with every scene description request.
pub const SCENE_PROMPT: &str = "\
As an AI assistant for visually impaired individuals, provide a detailed description of this image.
Include:
1. Overall scene layout
2. Main objects and their positions
3. People and their activities (if any)
4. Colors and lighting
5. Notable features or points of interest

Format the response in clear, easy-to-understand sections.";

/// Language used for all synthesized speech.
pub const SPEECH_LANGUAGE: &str = "en";

/// A decoded upload, normalized to 8-bit RGB.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pixels: RgbImage,
}

impl ImageInput {
    /// Decode raw file bytes. The format is sniffed from the content.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(image))
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: image.to_rgb8(),
        }
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Serialize losslessly as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut buf = Cursor::new(Vec::new());
        self.pixels.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

/// PNG bytes in base64, ready to embed in a JSON request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImagePayload {
    mime_type: &'static str,
    data: String,
}

impl EncodedImagePayload {
    pub fn from_image(image: &ImageInput) -> Result<Self, ImageError> {
        let png = image.to_png()?;
        Ok(Self {
            mime_type: "image/png",
            data: STANDARD.encode(png),
        })
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Base64 text, standard alphabet with padding.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The fixed scene prompt plus one encoded image.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    prompt: &'static str,
    image: EncodedImagePayload,
}

impl VisionRequest {
    pub fn scene(image: &ImageInput) -> Result<Self, ImageError> {
        Ok(Self {
            prompt: SCENE_PROMPT,
            image: EncodedImagePayload::from_image(image)?,
        })
    }

    pub fn prompt(&self) -> &str {
        self.prompt
    }

    pub fn image(&self) -> &EncodedImagePayload {
        &self.image
    }
}

/// Free-form description text, kept exactly as the vision capability produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionText(String);

impl DescriptionText {
    /// Returns `None` when the text has no visible content.
    pub fn new(raw: String) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DescriptionText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recognized text with surrounding whitespace removed. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Trim OCR output. Empty or whitespace-only output means no text was found.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Synthesized speech held in memory.
///
/// Each artifact gets its own id and buffer, so concurrent requests never
/// share storage. The buffer is released when the artifact is consumed with
/// [`AudioArtifact::into_bytes`] or dropped.
pub struct AudioArtifact {
    id: Uuid,
    mime_type: &'static str,
    bytes: Bytes,
}

impl AudioArtifact {
    pub fn new(bytes: Bytes, mime_type: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            mime_type,
            bytes,
        }
    }

    pub fn mp3(bytes: Bytes) -> Self {
        Self::new(bytes, "audio/mpeg")
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hand the audio to its consumer.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl fmt::Debug for AudioArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioArtifact")
            .field("id", &self.id)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    fn checkerboard() -> ImageInput {
        let pixels = RgbImage::from_fn(8, 8, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        ImageInput::from_rgb(pixels)
    }

    #[test]
    fn decode_normalizes_to_rgb() {
        let rgba = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128]));
        let mut buf = Cursor::new(Vec::new());
        rgba.write_to(&mut buf, ImageFormat::Png).unwrap();

        let input = ImageInput::decode(buf.get_ref()).unwrap();
        assert_eq!((input.width(), input.height()), (4, 3));
        assert_eq!(input.pixels().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(ImageInput::decode(b"definitely not an image").is_err());
    }

    #[test]
    fn png_serialization_is_lossless() {
        let input = checkerboard();
        let png = input.to_png().unwrap();
        let back = ImageInput::decode(&png).unwrap();
        assert_eq!(back.pixels(), input.pixels());
    }

    #[test]
    fn payload_is_base64_png() {
        let payload = EncodedImagePayload::from_image(&checkerboard()).unwrap();
        assert_eq!(payload.mime_type(), "image/png");
        let raw = STANDARD.decode(payload.data()).unwrap();
        assert!(raw.starts_with(b"\x89PNG"));
        assert!(payload.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn scene_request_carries_prompt() {
        let request = VisionRequest::scene(&checkerboard()).unwrap();
        assert_eq!(request.prompt(), SCENE_PROMPT);
        assert!(request.prompt().contains("Colors and lighting"));
        assert!(!request.image().data().is_empty());
    }

    #[test]
    fn extracted_text_is_trimmed() {
        let text = ExtractedText::normalize("\n  Hello, world.  \n\n").unwrap();
        assert_eq!(text.as_str(), "Hello, world.");
    }

    #[test]
    fn blank_ocr_output_is_absent() {
        assert!(ExtractedText::normalize("").is_none());
        assert!(ExtractedText::normalize(" \n\t \x0c").is_none());
    }

    #[test]
    fn description_keeps_raw_text() {
        let raw = "  **Layout**\nA kitchen.\n".to_string();
        let text = DescriptionText::new(raw.clone()).unwrap();
        assert_eq!(text.as_str(), raw);
        assert!(DescriptionText::new("   ".into()).is_none());
    }

    #[test]
    fn audio_artifacts_are_distinct() {
        let a = AudioArtifact::mp3(Bytes::from_static(b"ID3"));
        let b = AudioArtifact::mp3(Bytes::from_static(b"ID3"));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.mime_type(), "audio/mpeg");
        assert_eq!(a.into_bytes(), Bytes::from_static(b"ID3"));
    }
}
