pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    DescriptionError, OcrError, PipelineError, SpeechError, Stage, TimeoutError,
};
pub use traits::{OcrCapability, SpeechCapability, VisionCapability};
pub use types::{
    AudioArtifact, DescriptionText, EncodedImagePayload, ExtractedText, ImageInput,
    VisionRequest, SCENE_PROMPT, SPEECH_LANGUAGE,
};
