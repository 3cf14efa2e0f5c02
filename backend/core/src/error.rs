use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// The external capability a pipeline step talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Vision,
    Ocr,
    Speech,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vision => "vision",
            Self::Ocr => "ocr",
            Self::Speech => "speech",
        };
        f.write_str(name)
    }
}

/// An external capability call did not finish within its bound.
#[derive(Debug, Clone, Error)]
#[error("{stage} capability timed out after {after:?}")]
pub struct TimeoutError {
    pub stage: Stage,
    pub after: Duration,
}

/// Failure of the scene description pipeline.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("vision capability failed: {0}")]
    Capability(String),

    #[error("vision capability returned an empty description")]
    EmptyResponse,

    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

/// Failure of the text recognition stage.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("text recognition failed: {0}")]
    Capability(String),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

/// Failure of the speech synthesis stage.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis failed: {0}")]
    Capability(String),

    #[error("speech capability returned no audio")]
    EmptyAudio,

    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

/// Any pipeline failure, for surfaces that render both pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Speech(#[from] SpeechError),
}

impl PipelineError {
    /// Whether the failure was a timeout rather than a capability error.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Description(DescriptionError::Timeout(_))
                | Self::Ocr(OcrError::Timeout(_))
                | Self::Speech(SpeechError::Timeout(_))
        )
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Description(_) => Stage::Vision,
            Self::Ocr(_) => Stage::Ocr,
            Self::Speech(_) => Stage::Speech,
        }
    }
}
