//! Builds capability clients and pipelines from configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use iris_config::defaults::{DEFAULT_OCR_BINARY, DEFAULT_SPEECH_PROVIDER, DEFAULT_VISION_PROVIDER};
use iris_config::IrisConfig;
use iris_core::{SpeechCapability, VisionCapability};
use iris_pipeline::{Assistant, DescriptionPipeline, SpeechPipeline};
use iris_tts::{create_tts, SpeechEngine, TtsProviderKind};
use iris_understanding::{create_vision, TesseractOcr, VisionProviderKind};
use tracing::info;

/// Scene description needs a vision credential; everything else has defaults.
pub fn build_description(config: &IrisConfig) -> Result<DescriptionPipeline> {
    let vision = config.vision.clone().unwrap_or_default();
    let Some(api_key) = vision.api_key.filter(|k| !k.is_empty()) else {
        bail!(
            "No vision API key configured. Set GOOGLE_API_KEY (or OPENAI_API_KEY for the openai \
             provider), or reference one as ${{VAR}} in {}",
            config_hint().display()
        );
    };

    let kind = match vision.provider.as_deref().unwrap_or(DEFAULT_VISION_PROVIDER) {
        "openai" => VisionProviderKind::OpenAi {
            api_key,
            model: vision.model,
            base_url: vision.base_url,
        },
        _ => VisionProviderKind::Gemini {
            api_key,
            model: vision.model,
            base_url: vision.base_url,
        },
    };
    let capability = create_vision(kind);
    info!(provider = capability.name(), "Vision capability ready");
    Ok(DescriptionPipeline::new(capability, config.vision_timeout()))
}

pub fn build_speech(config: &IrisConfig) -> Result<SpeechPipeline> {
    let ocr = config.ocr.clone().unwrap_or_default();
    let mut tesseract =
        TesseractOcr::new(ocr.binary.unwrap_or_else(|| DEFAULT_OCR_BINARY.to_string()));
    if let Some(language) = ocr.language {
        tesseract = tesseract.with_language(language);
    }

    let speech = config.speech.clone().unwrap_or_default();
    let kind = match speech.provider.as_deref().unwrap_or(DEFAULT_SPEECH_PROVIDER) {
        "openai" => {
            let Some(api_key) = speech.api_key.filter(|k| !k.is_empty()) else {
                bail!("OpenAI speech requires speech.apiKey or OPENAI_API_KEY");
            };
            TtsProviderKind::OpenAi {
                api_key,
                voice: speech.voice,
                base_url: speech.base_url,
            }
        }
        _ => TtsProviderKind::GoogleTranslate {
            base_url: speech.base_url,
        },
    };
    let engine = SpeechEngine::new(create_tts(kind));
    info!(ocr = "tesseract", speech = engine.name(), "Read-aloud capabilities ready");

    Ok(SpeechPipeline::new(
        Arc::new(tesseract),
        Arc::new(engine),
        config.ocr_timeout(),
        config.speech_timeout(),
    ))
}

pub fn build_assistant(config: &IrisConfig) -> Result<Assistant> {
    Ok(Assistant::new(build_description(config)?, build_speech(config)?))
}

fn config_hint() -> PathBuf {
    iris_config::config_file_path(&iris_config::config_dir())
}
