use std::sync::Arc;
use std::time::{Duration, Instant};

use iris_core::{
    DescriptionError, DescriptionText, ImageInput, Stage, VisionCapability, VisionRequest,
};
use iris_logging::{EventLogger, PipelineEvent};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::timeout::bounded;

/// Image in, scene description out.
pub struct DescriptionPipeline {
    vision: Arc<dyn VisionCapability>,
    timeout: Duration,
}

impl DescriptionPipeline {
    pub fn new(vision: Arc<dyn VisionCapability>, timeout: Duration) -> Self {
        Self { vision, timeout }
    }

    /// Describe the scene in `image` with the fixed five-point prompt.
    ///
    /// Returns the model's text untouched. Every failure, including an empty
    /// reply, comes back as a [`DescriptionError`].
    pub async fn describe_scene(
        &self,
        image: ImageInput,
    ) -> Result<DescriptionText, DescriptionError> {
        let invocation = Uuid::new_v4().to_string();
        let span = info_span!("describe_scene", %invocation, provider = self.vision.name());
        let started = Instant::now();

        let result = self.run(image).instrument(span).await;

        match &result {
            Ok(text) => EventLogger::log_event(
                &invocation,
                PipelineEvent::DescriptionCompleted {
                    provider: self.vision.name().to_string(),
                    chars: text.as_str().chars().count(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                },
            ),
            Err(e) => EventLogger::log_event(
                &invocation,
                PipelineEvent::Failed {
                    stage: Stage::Vision.to_string(),
                    error_msg: e.to_string(),
                },
            ),
        }
        result
    }

    async fn run(&self, image: ImageInput) -> Result<DescriptionText, DescriptionError> {
        // PNG encoding is CPU-bound; keep it off the async workers.
        let request = tokio::task::spawn_blocking(move || VisionRequest::scene(&image))
            .await
            .map_err(|e| DescriptionError::Encode(e.to_string()))?
            .map_err(|e| DescriptionError::Encode(e.to_string()))?;

        let raw = bounded(Stage::Vision, self.timeout, self.vision.describe(&request))
            .await?
            .map_err(|e| DescriptionError::Capability(format!("{e:#}")))?;

        DescriptionText::new(raw).ok_or(DescriptionError::EmptyResponse)
    }
}
