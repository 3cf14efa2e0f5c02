//! The two request/response pipelines behind every upload.
//!
//! Each pipeline owns nothing but injected capability clients and timeout
//! bounds, so one [`Assistant`] can serve any number of concurrent requests.

pub mod describe;
pub mod speak;
mod timeout;

#[cfg(test)]
pub(crate) mod fakes;

pub use describe::DescriptionPipeline;
pub use speak::{SpeakOutcome, SpeechPipeline};

/// Both pipelines, ready to be shared across request handlers.
pub struct Assistant {
    description: DescriptionPipeline,
    speech: SpeechPipeline,
}

impl Assistant {
    pub fn new(description: DescriptionPipeline, speech: SpeechPipeline) -> Self {
        Self { description, speech }
    }

    pub fn description(&self) -> &DescriptionPipeline {
        &self.description
    }

    pub fn speech(&self) -> &SpeechPipeline {
        &self.speech
    }
}
