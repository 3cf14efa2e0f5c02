use std::sync::Arc;
use std::time::{Duration, Instant};

use iris_core::{
    AudioArtifact, ExtractedText, ImageInput, OcrCapability, OcrError, SPEECH_LANGUAGE,
    SpeechCapability, SpeechError, Stage,
};
use iris_logging::{EventLogger, PipelineEvent};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::timeout::bounded;

/// Result of reading an image aloud, short of an OCR failure.
#[derive(Debug)]
pub enum SpeakOutcome {
    /// Nothing legible in the image. Not an error.
    NoText,
    Spoken {
        text: ExtractedText,
        audio: AudioArtifact,
    },
    /// Text was found but could not be voiced.
    TextOnly {
        text: ExtractedText,
        error: SpeechError,
    },
}

impl SpeakOutcome {
    pub fn text(&self) -> Option<&ExtractedText> {
        match self {
            Self::NoText => None,
            Self::Spoken { text, .. } | Self::TextOnly { text, .. } => Some(text),
        }
    }
}

/// OCR followed by speech synthesis.
pub struct SpeechPipeline {
    ocr: Arc<dyn OcrCapability>,
    speech: Arc<dyn SpeechCapability>,
    ocr_timeout: Duration,
    speech_timeout: Duration,
}

impl SpeechPipeline {
    pub fn new(
        ocr: Arc<dyn OcrCapability>,
        speech: Arc<dyn SpeechCapability>,
        ocr_timeout: Duration,
        speech_timeout: Duration,
    ) -> Self {
        Self {
            ocr,
            speech,
            ocr_timeout,
            speech_timeout,
        }
    }

    /// Recognize text in `image`. Blank output yields `Ok(None)`.
    pub async fn extract_text(
        &self,
        image: &ImageInput,
    ) -> Result<Option<ExtractedText>, OcrError> {
        let raw = bounded(Stage::Ocr, self.ocr_timeout, self.ocr.recognize(image))
            .await?
            .map_err(|e| OcrError::Capability(format!("{e:#}")))?;
        Ok(ExtractedText::normalize(&raw))
    }

    /// Voice `text` in English.
    pub async fn synthesize_speech(
        &self,
        text: &ExtractedText,
    ) -> Result<AudioArtifact, SpeechError> {
        let bytes = bounded(
            Stage::Speech,
            self.speech_timeout,
            self.speech.speak(text.as_str(), SPEECH_LANGUAGE),
        )
        .await?
        .map_err(|e| SpeechError::Capability(format!("{e:#}")))?;

        if bytes.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(AudioArtifact::new(bytes, self.speech.mime_type()))
    }

    /// Extract text, then voice it if there is any.
    ///
    /// Only an OCR failure is an `Err`. A synthesis failure still returns the
    /// extracted text as [`SpeakOutcome::TextOnly`].
    pub async fn extract_and_speak(&self, image: ImageInput) -> Result<SpeakOutcome, OcrError> {
        let invocation = Uuid::new_v4().to_string();
        let span = info_span!(
            "extract_and_speak",
            %invocation,
            ocr = self.ocr.name(),
            speech = self.speech.name()
        );
        self.run(&invocation, image).instrument(span).await
    }

    async fn run(&self, invocation: &str, image: ImageInput) -> Result<SpeakOutcome, OcrError> {
        let started = Instant::now();
        let extracted = self.extract_text(&image).await;
        drop(image);

        let text = match extracted {
            Ok(Some(text)) => text,
            Ok(None) => {
                EventLogger::log_event(
                    invocation,
                    PipelineEvent::NoTextFound {
                        provider: self.ocr.name().to_string(),
                        elapsed_ms: elapsed_ms(started),
                    },
                );
                return Ok(SpeakOutcome::NoText);
            }
            Err(e) => {
                log_failure(invocation, Stage::Ocr, &e);
                return Err(e);
            }
        };
        EventLogger::log_event(
            invocation,
            PipelineEvent::TextExtracted {
                provider: self.ocr.name().to_string(),
                chars: text.as_str().chars().count(),
                elapsed_ms: elapsed_ms(started),
            },
        );

        let started = Instant::now();
        match self.synthesize_speech(&text).await {
            Ok(audio) => {
                EventLogger::log_event(
                    invocation,
                    PipelineEvent::SpeechSynthesized {
                        provider: self.speech.name().to_string(),
                        bytes: audio.len(),
                        elapsed_ms: elapsed_ms(started),
                    },
                );
                Ok(SpeakOutcome::Spoken { text, audio })
            }
            Err(error) => {
                log_failure(invocation, Stage::Speech, &error);
                Ok(SpeakOutcome::TextOnly { text, error })
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn log_failure(invocation: &str, stage: Stage, error: &dyn std::error::Error) {
    EventLogger::log_event(
        invocation,
        PipelineEvent::Failed {
            stage: stage.to_string(),
            error_msg: error.to_string(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{Scripted, white_image};

    fn pipeline(ocr: Arc<Scripted>, speech: Arc<Scripted>) -> SpeechPipeline {
        SpeechPipeline::new(ocr, speech, Duration::from_secs(5), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn printed_sentence_is_trimmed_and_spoken() {
        let ocr = Arc::new(Scripted::ok("\n  The quick brown fox jumps over the lazy dog.  \n\x0c"));
        let speech = Arc::new(Scripted::ok("mp3-frames"));
        let outcome = pipeline(ocr, speech.clone())
            .extract_and_speak(white_image())
            .await
            .unwrap();

        match outcome {
            SpeakOutcome::Spoken { text, audio } => {
                assert_eq!(text.as_str(), "The quick brown fox jumps over the lazy dog.");
                assert_eq!(speech.seen(), vec![text.as_str().to_string()]);
                assert!(!audio.is_empty());
                assert_eq!(audio.mime_type(), "audio/mpeg");
            }
            other => panic!("expected spoken outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_image_stops_before_synthesis() {
        let ocr = Arc::new(Scripted::ok(" \n\n "));
        let speech = Arc::new(Scripted::ok("never"));
        let outcome = pipeline(ocr, speech.clone())
            .extract_and_speak(white_image())
            .await
            .unwrap();
        assert!(matches!(outcome, SpeakOutcome::NoText));
        assert!(outcome.text().is_none());
        assert_eq!(speech.calls(), 0);
    }

    #[tokio::test]
    async fn ocr_failure_ends_the_pipeline() {
        let ocr = Arc::new(Scripted::err("tesseract not installed"));
        let speech = Arc::new(Scripted::ok("never"));
        let err = pipeline(ocr, speech.clone())
            .extract_and_speak(white_image())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Capability(ref m) if m.contains("tesseract")));
        assert_eq!(speech.calls(), 0);
    }

    #[tokio::test]
    async fn speech_failure_keeps_extracted_text() {
        let ocr = Arc::new(Scripted::ok("EXIT"));
        let speech = Arc::new(Scripted::err("503 Service Unavailable"));
        let outcome = pipeline(ocr, speech)
            .extract_and_speak(white_image())
            .await
            .unwrap();
        match outcome {
            SpeakOutcome::TextOnly { text, error } => {
                assert_eq!(text.as_str(), "EXIT");
                assert!(matches!(error, SpeechError::Capability(_)));
            }
            other => panic!("expected partial success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_audio_is_a_speech_error() {
        let ocr = Arc::new(Scripted::ok("EXIT"));
        let speech = Arc::new(Scripted::ok(""));
        let outcome = pipeline(ocr, speech)
            .extract_and_speak(white_image())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            SpeakOutcome::TextOnly { error: SpeechError::EmptyAudio, .. }
        ));
    }

    #[tokio::test]
    async fn each_stage_has_its_own_timeout() {
        let ocr = Arc::new(Scripted::ok("x").slow(Duration::from_secs(5)));
        let speech = Arc::new(Scripted::ok("audio"));
        let slow_ocr = SpeechPipeline::new(ocr, speech, Duration::from_millis(50), Duration::from_secs(5));
        let err = slow_ocr.extract_text(&white_image()).await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout(ref t) if t.stage == Stage::Ocr));

        let ocr = Arc::new(Scripted::ok("STOP"));
        let speech = Arc::new(Scripted::ok("audio").slow(Duration::from_secs(5)));
        let slow_speech = SpeechPipeline::new(ocr, speech, Duration::from_secs(5), Duration::from_millis(50));
        let outcome = slow_speech.extract_and_speak(white_image()).await.unwrap();
        match outcome {
            SpeakOutcome::TextOnly { text, error: SpeechError::Timeout(t) } => {
                assert_eq!(text.as_str(), "STOP");
                assert_eq!(t.stage, Stage::Speech);
            }
            other => panic!("expected speech timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_invocations_get_separate_audio() {
        let ocr = Arc::new(Scripted::ok("PUSH"));
        let speech = Arc::new(Scripted::ok("frames"));
        let pipeline = Arc::new(pipeline(ocr, speech));

        let (a, b) = tokio::join!(
            pipeline.extract_and_speak(white_image()),
            pipeline.extract_and_speak(white_image()),
        );
        let id = |o: SpeakOutcome| match o {
            SpeakOutcome::Spoken { audio, .. } => audio.id(),
            other => panic!("expected spoken outcome, got {other:?}"),
        };
        assert_ne!(id(a.unwrap()), id(b.unwrap()));
    }
}
