pub mod ocr;
pub mod vision;

pub use ocr::TesseractOcr;
pub use vision::{GeminiVision, OpenAiVision, VisionProviderKind, create_vision};
